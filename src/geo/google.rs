//! Google Maps web service provider
//!
//! Reverse geocoding, places autocomplete and place details over the
//! provider's JSON APIs. Requires an API key.

use crate::address::{Coordinates, PlaceResult};
use crate::config::Config;
use crate::constants::api::{AUTOCOMPLETE_URL, GEOCODE_URL, PLACE_DETAILS_URL};
use crate::error::{Error, Result};
use crate::geo::{GeocodeResponse, GeocodeStatus, MapsProvider, Prediction};
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!("pickup-address/", env!("CARGO_PKG_VERSION"));

/// Fields requested from the details API
pub const DETAIL_FIELDS: &[&str] = &["address_components", "geometry", "icon", "name", "place_id"];

/// Place types requested from autocomplete
pub const AUTOCOMPLETE_TYPES: &[&str] = &["establishment", "geocode"];

/// Google Maps provider
#[derive(Debug, Clone)]
pub struct GoogleMapsProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    country: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: GeocodeStatus,
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: GeocodeStatus,
    #[serde(default)]
    result: Option<PlaceResult>,
    #[serde(default)]
    error_message: Option<String>,
}

impl GoogleMapsProvider {
    /// Create a provider with an explicit key and country restriction
    pub fn new(api_key: Option<String>, country: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            country: country.into(),
            language: crate::config::defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Create a provider from configuration
    pub fn from_config(config: &Config) -> Self {
        let mut provider = Self::new(config.api_key(), config.provider.country.clone());
        provider.language = config.provider.language.clone();
        provider
    }

    /// Whether an API key is available
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Provider("No provider API key configured".to_string()))
    }

    fn reverse_url(&self, coords: Coordinates, key: &str) -> String {
        format!(
            "{}?latlng={},{}&language={}&key={}",
            GEOCODE_URL,
            coords.lat,
            coords.lng,
            urlencoding::encode(&self.language),
            urlencoding::encode(key)
        )
    }

    fn autocomplete_url(&self, input: &str, key: &str) -> String {
        format!(
            "{}?input={}&components=country:{}&types={}&language={}&key={}",
            AUTOCOMPLETE_URL,
            urlencoding::encode(input),
            urlencoding::encode(&self.country),
            urlencoding::encode(&AUTOCOMPLETE_TYPES.join("|")),
            urlencoding::encode(&self.language),
            urlencoding::encode(key)
        )
    }

    fn details_url(&self, place_id: &str, key: &str) -> String {
        format!(
            "{}?place_id={}&fields={}&language={}&key={}",
            PLACE_DETAILS_URL,
            urlencoding::encode(place_id),
            urlencoding::encode(&DETAIL_FIELDS.join(",")),
            urlencoding::encode(&self.language),
            urlencoding::encode(key)
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "Provider returned status: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

impl MapsProvider for GoogleMapsProvider {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<GeocodeResponse> {
        let key = self.key()?;
        debug!(lat = coords.lat, lng = coords.lng, "reverse geocoding");
        self.get_json(&self.reverse_url(coords, key)).await
    }

    async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let key = self.key()?;
        let response: AutocompleteResponse = self.get_json(&self.autocomplete_url(input, key)).await?;

        match response.status {
            GeocodeStatus::Ok => Ok(response.predictions),
            GeocodeStatus::ZeroResults => Ok(Vec::new()),
            status => Err(Error::Provider(format!(
                "Autocomplete failed with {}: {}",
                status,
                response.error_message.unwrap_or_default()
            ))),
        }
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceResult>> {
        let key = self.key()?;
        let response: DetailsResponse = self.get_json(&self.details_url(place_id, key)).await?;

        match response.status {
            GeocodeStatus::Ok => Ok(response.result),
            GeocodeStatus::NotFound | GeocodeStatus::ZeroResults => Ok(None),
            status => Err(Error::Provider(format!(
                "Place details failed with {}: {}",
                status,
                response.error_message.unwrap_or_default()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleMapsProvider {
        GoogleMapsProvider::new(Some("test-key".to_string()), "in")
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_http_error() {
        let result: Result<GeocodeResponse> = provider().get_json("http://127.0.0.1:1/geocode").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[test]
    fn test_reverse_url() {
        let url = provider().reverse_url(Coordinates::new(27.7, 85.3), "test-key");
        assert!(url.starts_with(GEOCODE_URL));
        assert!(url.contains("latlng=27.7,85.3"));
        assert!(url.contains("key=test-key"));
    }

    #[test]
    fn test_autocomplete_url_restricts_country() {
        let url = provider().autocomplete_url("mg road", "test-key");
        assert!(url.contains("input=mg%20road"));
        assert!(url.contains("components=country:in"));
        assert!(url.contains("types=establishment%7Cgeocode"));
    }

    #[test]
    fn test_details_url_fields() {
        let url = provider().details_url("ChIJ123", "test-key");
        assert!(url.contains("place_id=ChIJ123"));
        assert!(url.contains("fields=address_components%2Cgeometry%2Cicon%2Cname%2Cplace_id"));
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let provider = GoogleMapsProvider::new(None, "in");
        assert!(!provider.has_key());

        let result = provider.reverse_geocode(Coordinates::new(1.0, 2.0)).await;
        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[tokio::test]
    async fn test_blank_autocomplete_input_skips_request() {
        let provider = GoogleMapsProvider::new(None, "in");
        let predictions = provider.autocomplete("   ").await.unwrap();
        assert!(predictions.is_empty());
    }

    #[test]
    fn test_details_response_parsing() {
        let json = r#"{
            "result": {
                "name": "India Gate",
                "address_components": [],
                "geometry": {"location": {"lat": 28.6129, "lng": 77.2295}}
            },
            "status": "OK"
        }"#;
        let response: DetailsResponse = serde_json::from_str(json).unwrap();
        assert!(response.status.is_ok());
        assert_eq!(response.result.unwrap().name.as_deref(), Some("India Gate"));
    }
}
