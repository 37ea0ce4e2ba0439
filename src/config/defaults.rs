//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default autocomplete country restriction (ISO 3166-1 alpha-2)
pub const DEFAULT_COUNTRY: &str = "in";

/// Default provider response language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default map style id
pub const DEFAULT_MAP_ID: &str = "f067f7b3872c829b";

/// Default map zoom level
pub const DEFAULT_ZOOM: u8 = 10;

/// Default idle lifetime of a picker session in seconds
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Default cap on live picker sessions
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default form submission method
pub const DEFAULT_FORM_METHOD: &str = "post";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "pickup-address";
