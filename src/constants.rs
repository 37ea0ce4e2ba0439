//! Centralized constants for the pickup-address crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// External API endpoints
pub mod api {
    /// Google Geocoding API (reverse geocoding)
    pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

    /// Google Places autocomplete API
    pub const AUTOCOMPLETE_URL: &str =
        "https://maps.googleapis.com/maps/api/place/autocomplete/json";

    /// Google Places details API
    pub const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

    /// Google Maps JavaScript loader (used by the browser)
    pub const MAPS_JS_URL: &str = "https://maps.googleapis.com/maps/api/js";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Environment variable holding the provider API key
    pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

/// Address component type tags
pub mod tags {
    pub const LOCALITY: &str = "locality";
    pub const ADMIN_LEVEL_3: &str = "administrative_area_level_3";
    pub const ADMIN_LEVEL_1: &str = "administrative_area_level_1";
    pub const POSTAL_CODE: &str = "postal_code";
}

/// User-facing location messages
pub mod messages {
    pub const LOCATION_ACCESS_DENIED: &str = "You have not provided location access";
    pub const LOCATION_UNAVAILABLE: &str = "Location is not available at the moment";
    pub const LOCATION_UNKNOWN: &str = "Please provide location access";
    pub const GEOLOCATION_UNSUPPORTED: &str =
        "Sorry, your browser does not support HTML5 geolocation.";
}
