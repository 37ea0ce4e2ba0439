//! Mapping provider module
//!
//! Provides reverse geocoding, places autocomplete and place details from
//! the mapping provider, plus IP geolocation.

pub mod google;
pub mod ip_location;

use crate::address::{AddressComponent, Coordinates, Geometry, PlaceResult};
use crate::config::Config;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Provider response status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    Ok,
    ZeroResults,
    OverDailyLimit,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    NotFound,
    UnknownError,
    #[serde(other)]
    Other,
}

impl GeocodeStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::OverDailyLimit => "OVER_DAILY_LIMIT",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

/// One reverse geocoding result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// Reverse geocoding response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub status: GeocodeStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    /// A response carrying only a status
    pub fn status_only(status: GeocodeStatus) -> Self {
        Self {
            status,
            results: Vec::new(),
            error_message: None,
        }
    }
}

/// An autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
}

/// Trait for mapping providers
pub trait MapsProvider: Send + Sync {
    /// Reverse geocode a coordinate
    ///
    /// Provider-level failures come back as a non-OK status; `Err` means the
    /// request itself could not be made or decoded.
    fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> impl std::future::Future<Output = Result<GeocodeResponse>> + Send;

    /// Suggest places for a partial address
    fn autocomplete(
        &self,
        input: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Prediction>>> + Send;

    /// Look up a place by id
    ///
    /// Returns None if the provider does not know the place
    fn place_details(
        &self,
        place_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<PlaceResult>>> + Send;
}

/// Get the configured mapping provider
pub fn get_provider(config: &Config) -> google::GoogleMapsProvider {
    google::GoogleMapsProvider::from_config(config)
}

/// Get the IP location service
pub fn get_ip_locator() -> ip_location::IpLocator {
    ip_location::IpLocator::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocode_response_parsing() {
        let json = r#"{
            "results": [{
                "formatted_address": "MG Road, Bengaluru, Karnataka 560001, India",
                "address_components": [
                    {"long_name": "Bengaluru", "short_name": "Bengaluru", "types": ["locality"]}
                ],
                "geometry": {"location": {"lat": 12.975, "lng": 77.605}},
                "place_id": "abc"
            }],
            "status": "OK"
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert!(response.status.is_ok());
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].address_components[0].long_name, "Bengaluru");
    }

    #[test]
    fn test_status_parsing() {
        let parse = |s: &str| -> GeocodeStatus {
            serde_json::from_str(&format!("\"{}\"", s)).unwrap()
        };

        assert_eq!(parse("ZERO_RESULTS"), GeocodeStatus::ZeroResults);
        assert_eq!(parse("REQUEST_DENIED"), GeocodeStatus::RequestDenied);
        assert_eq!(parse("SOMETHING_NEW"), GeocodeStatus::Other);
        assert_eq!(GeocodeStatus::OverQueryLimit.to_string(), "OVER_QUERY_LIMIT");
    }

    #[test]
    fn test_status_only_response() {
        let json = r#"{"results": [], "status": "ZERO_RESULTS"}"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response, GeocodeResponse::status_only(GeocodeStatus::ZeroResults));
    }
}
