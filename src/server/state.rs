//! Server shared state
//!
//! Holds configuration and shared resources for the HTTP server.

use crate::config::Config;
use crate::error::Result;
use crate::geo::google::GoogleMapsProvider;
use crate::geo::ip_location::IpLocator;
use crate::geo::{get_provider, MapsProvider};
use crate::page::PageRenderer;
use crate::session::SessionStore;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<P> {
    /// Configuration
    pub config: Config,

    /// Mapping provider
    pub provider: P,

    /// Live picker sessions
    pub sessions: SessionStore,

    /// Page template
    pub pages: PageRenderer,

    /// Server-side geolocation, when enabled
    pub ip_locator: Option<IpLocator>,

    started_at: Instant,
}

impl AppState<GoogleMapsProvider> {
    /// Create application state backed by the configured provider
    pub fn new(config: Config) -> Result<Self> {
        let provider = get_provider(&config);
        Self::with_provider(config, provider)
    }
}

impl<P: MapsProvider> AppState<P> {
    /// Create application state with a specific provider
    pub fn with_provider(config: Config, provider: P) -> Result<Self> {
        let ip_locator = config.location.ip_fallback.then(IpLocator::new);

        Ok(Self {
            sessions: SessionStore::new(&config.session),
            pages: PageRenderer::new()?,
            config,
            provider,
            ip_locator,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
