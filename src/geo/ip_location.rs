//! IP-based geolocation
//!
//! Uses ip-api.com for IP geolocation with file-based caching. Serves as a
//! server-side geolocation source when the browser reports no position.

use crate::address::Coordinates;
use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::config::defaults::APP_DIR_NAME;
use crate::error::{Error, Result};
use crate::locate::{GeolocationSource, PositionError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A located position with a rough description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub coords: Coordinates,
    /// "City, Region, Country" where known
    pub display_name: String,
}

/// IP location service with caching
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedLocation {
    location: IpLocation,
    fetched_at: DateTime<Utc>,
}

impl IpLocator {
    /// Create a new IP locator with default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir()
            .map(|p| p.join(APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));

        Self {
            client: reqwest::Client::new(),
            cache_path,
        }
    }

    /// Create an IP locator with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: Some(cache_path),
        }
    }

    /// Create an IP locator without caching
    pub fn without_cache() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_path: None,
        }
    }

    /// Get current location based on IP address
    pub async fn locate(&self) -> Result<IpLocation> {
        if let Some(cached) = self.load_cache() {
            debug!("using cached IP location");
            return Ok(cached);
        }

        let location = self.fetch_location().await?;
        self.save_cache(&location);

        Ok(location)
    }

    /// Fetch location from ip-api.com
    async fn fetch_location(&self) -> Result<IpLocation> {
        let response = self
            .client
            .get(IP_API_URL)
            .send()
            .await
            .map_err(|e| Error::Geo(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse IP location response: {}", e)))?;

        Self::location_from_response(data)
    }

    fn location_from_response(data: IpApiResponse) -> Result<IpLocation> {
        if data.status != "success" {
            return Err(Error::Geo("IP location lookup failed".to_string()));
        }

        let lat = data.lat.ok_or_else(|| Error::Geo("No latitude in response".to_string()))?;
        let lng = data.lon.ok_or_else(|| Error::Geo("No longitude in response".to_string()))?;

        let display_name = [data.city, data.region_name, data.country]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        let coords = Coordinates::new(lat, lng);
        coords.validate()?;

        Ok(IpLocation {
            coords,
            display_name: if display_name.is_empty() {
                "Unknown Location".to_string()
            } else {
                display_name
            },
        })
    }

    /// Cached location, if one was fetched within the TTL
    fn load_cache(&self) -> Option<IpLocation> {
        let cache_path = self.cache_path.as_ref()?;
        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedLocation = serde_json::from_str(&content).ok()?;

        let age = Utc::now().signed_duration_since(cached.fetched_at);
        (age < chrono::Duration::seconds(IP_LOCATION_TTL_SECS as i64)).then_some(cached.location)
    }

    /// Best-effort cache write; a failure only costs a refetch
    fn save_cache(&self, location: &IpLocation) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                debug!("could not create IP location cache directory: {}", e);
                return;
            }
        }

        let cached = CachedLocation {
            location: location.clone(),
            fetched_at: Utc::now(),
        };

        match serde_json::to_string_pretty(&cached) {
            Ok(content) => {
                if let Err(e) = fs::write(cache_path, content) {
                    debug!("could not write IP location cache: {}", e);
                }
            }
            Err(e) => debug!("could not encode IP location cache: {}", e),
        }
    }

    /// Forget the cached location
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationSource for IpLocator {
    async fn current_position(&self) -> std::result::Result<Coordinates, PositionError> {
        match self.locate().await {
            Ok(location) => Ok(location.coords),
            Err(e) => {
                warn!("IP geolocation failed: {}", e);
                Err(PositionError::PositionUnavailable)
            }
        }
    }
}
