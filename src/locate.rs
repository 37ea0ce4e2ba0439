//! Location acquisition
//!
//! Picks the starting coordinate: explicit `lat`/`lng` query parameters win,
//! otherwise a geolocation source is asked for the current position.
//! Failures become one of a few fixed, user-facing messages and never touch
//! the current address.

use crate::address::{Address, Coordinates};
use crate::constants::messages;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Why a geolocation source could not produce a position
///
/// Codes follow the browser geolocation API (1, 2, 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown,
}

impl PositionError {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// User-facing message for this failure
    pub fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied | Self::Timeout => messages::LOCATION_ACCESS_DENIED,
            Self::PositionUnavailable => messages::LOCATION_UNAVAILABLE,
            Self::Unknown => messages::LOCATION_UNKNOWN,
        }
    }
}

/// A failed acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    Position(PositionError),
    /// No geolocation capability at all
    Unsupported,
}

impl LocationError {
    pub fn message(self) -> &'static str {
        match self {
            Self::Position(e) => e.message(),
            Self::Unsupported => messages::GEOLOCATION_UNSUPPORTED,
        }
    }
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Anything that can report the device's current position
pub trait GeolocationSource: Send + Sync {
    fn current_position(
        &self,
    ) -> impl std::future::Future<Output = std::result::Result<Coordinates, PositionError>> + Send;
}

/// A position report already produced by the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceReport {
    Position { lat: f64, lng: f64 },
    Error { code: u16 },
    /// The browser has no geolocation capability
    Unsupported,
}

impl DeviceReport {
    /// This report as a geolocation source, or None when the device has none
    pub fn as_source(&self) -> Option<&Self> {
        match self {
            Self::Unsupported => None,
            _ => Some(self),
        }
    }
}

impl GeolocationSource for DeviceReport {
    async fn current_position(&self) -> std::result::Result<Coordinates, PositionError> {
        match *self {
            Self::Position { lat, lng } => {
                let coords = Coordinates::new(lat, lng);
                coords
                    .validate()
                    .map(|_| coords)
                    .map_err(|_| PositionError::PositionUnavailable)
            }
            Self::Error { code } => Err(PositionError::from_code(code)),
            Self::Unsupported => Err(PositionError::Unknown),
        }
    }
}

/// Raw `lat`/`lng` query parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lng: Option<String>,
}

impl LocationQuery {
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            lat: Some(lat.into()),
            lng: Some(lng.into()),
        }
    }

    /// Coordinates from the query, if both parameters parse and are in range
    pub fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.as_deref()?.trim().parse::<f64>().ok()?;
        let lng = self.lng.as_deref()?.trim().parse::<f64>().ok()?;
        let coords = Coordinates::new(lat, lng);

        match coords.validate() {
            Ok(()) => Some(coords),
            Err(e) => {
                warn!("ignoring query coordinates: {}", e);
                None
            }
        }
    }

    /// The address a fresh page starts with
    pub fn initial_address(&self) -> Address {
        self.coordinates().map(Address::at).unwrap_or_default()
    }
}

/// Outcome of a location acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Acquisition {
    /// Taken from the URL, device not consulted
    Query { coords: Coordinates },
    /// Reported by the geolocation source
    Device { coords: Coordinates },
    Failed { error: LocationError },
}

impl Acquisition {
    /// Replacement address on success, text fields cleared
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::Query { coords } | Self::Device { coords } => Some(Address::at(*coords)),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<LocationError> {
        match self {
            Self::Failed { error } => Some(*error),
            _ => None,
        }
    }
}

/// Acquire a coordinate
///
/// `source` is None when the device has no geolocation capability.
pub async fn acquire<G: GeolocationSource>(query: &LocationQuery, source: Option<&G>) -> Acquisition {
    if let Some(coords) = query.coordinates() {
        debug!(lat = coords.lat, lng = coords.lng, "using query coordinates");
        return Acquisition::Query { coords };
    }

    let Some(source) = source else {
        return Acquisition::Failed {
            error: LocationError::Unsupported,
        };
    };

    match source.current_position().await {
        Ok(coords) => Acquisition::Device { coords },
        Err(e) => {
            debug!("geolocation failed: {:?}", e);
            Acquisition::Failed {
                error: LocationError::Position(e),
            }
        }
    }
}
