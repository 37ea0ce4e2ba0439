//! HTTP server for pickup-address
//!
//! Serves the picker page and the session API the browser script talks to.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::Result;
use crate::geo::MapsProvider;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    let state = AppState::new(config)?;
    serve(&addr, state).await
}

/// Start the HTTP server with a specific address and state
///
/// Useful for tests or when you want to swap the provider
pub async fn serve<P: MapsProvider + 'static>(addr: &str, state: AppState<P>) -> Result<()> {
    let addr: SocketAddr = addr.parse().map_err(|e| {
        crate::error::Error::Server(format!("Invalid server address: {}", e))
    })?;

    if state.config.api_key().is_none() {
        tracing::warn!("no provider API key configured; map and geocoding will not work");
    }

    let app = create_router(Arc::new(state));

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        crate::error::Error::Server(format!("Failed to bind to {}: {}", addr, e))
    })?;

    axum::serve(listener, app).await.map_err(|e| {
        crate::error::Error::Server(format!("Server error: {}", e))
    })?;

    Ok(())
}
