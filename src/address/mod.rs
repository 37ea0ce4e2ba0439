//! Address data model
//!
//! This module handles:
//! - Coordinates and their validation
//! - The structured pickup `Address`
//! - Provider place shapes (address components, geometry)
//! - Field extraction from provider places (see [`extract`])

pub mod extract;

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Coordinates ({}, {}) are not finite",
                self.lat, self.lng
            )));
        }
        if self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// The structured pickup address
///
/// Never mutated field by field: every interaction builds a new value and
/// replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Selected coordinate, `None` until something picks one
    pub coords: Option<Coordinates>,
    /// Display name (place name or formatted address)
    pub name: String,
    pub city: String,
    pub state: String,
    /// Postal code
    pub pincode: String,
}

impl Address {
    /// An address with a coordinate and no text yet
    ///
    /// Text fields are filled in later by reconciliation.
    pub fn at(coords: Coordinates) -> Self {
        Self {
            coords: Some(coords),
            ..Self::default()
        }
    }

    pub fn has_coords(&self) -> bool {
        self.coords.is_some()
    }
}

/// A provider latitude/longitude literal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(l: LatLng) -> Self {
        Coordinates::new(l.lat, l.lng)
    }
}

impl From<Coordinates> for LatLng {
    fn from(c: Coordinates) -> Self {
        LatLng { lat: c.lat, lng: c.lng }
    }
}

/// One typed component of a provider address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    /// Whether this component carries the given type tag
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// Place geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<LatLng>,
}

/// A place as returned by the provider's autocomplete widget or details API
///
/// Every field may be missing on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_components: Option<Vec<AddressComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}
