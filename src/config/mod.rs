//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/pickup-address/config.toml

pub mod defaults;

use crate::constants::api::API_KEY_ENV;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Mapping provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Map widget settings
    #[serde(default)]
    pub map: MapConfig,

    /// Location acquisition settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Picker session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Enclosing form settings
    #[serde(default)]
    pub form: FormConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Mapping provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key (falls back to GOOGLE_MAPS_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Country restriction for autocomplete
    #[serde(default = "default_country")]
    pub country: String,

    /// Response language
    #[serde(default = "default_language")]
    pub language: String,

    /// Map style id
    #[serde(default = "default_map_id")]
    pub map_id: String,
}

/// Map widget settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

/// Location acquisition settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Use IP geolocation when the browser sends no position report
    #[serde(default)]
    pub ip_fallback: bool,
}

/// Picker session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of live sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

/// Enclosing form settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Form action URL (empty submits to the page itself)
    #[serde(default)]
    pub action: String,

    /// Form method
    #[serde(default = "default_form_method")]
    pub method: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_map_id() -> String {
    DEFAULT_MAP_ID.to_string()
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}
fn default_form_method() -> String {
    DEFAULT_FORM_METHOD.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            country: default_country(),
            language: default_language(),
            map_id: default_map_id(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { zoom: default_zoom() }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            action: String::new(),
            method: default_form_method(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["provider", "api_key"] => Some(self.provider.api_key.clone()),
            ["provider", "country"] => Some(self.provider.country.clone()),
            ["provider", "language"] => Some(self.provider.language.clone()),
            ["provider", "map_id"] => Some(self.provider.map_id.clone()),

            ["map", "zoom"] => Some(self.map.zoom.to_string()),

            ["location", "ip_fallback"] => Some(self.location.ip_fallback.to_string()),

            ["session", "ttl_secs"] => Some(self.session.ttl_secs.to_string()),
            ["session", "max_sessions"] => Some(self.session.max_sessions.to_string()),

            ["form", "action"] => Some(self.form.action.clone()),
            ["form", "method"] => Some(self.form.method.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["provider", "api_key"] => {
                self.provider.api_key = value.to_string();
            }
            ["provider", "country"] => {
                if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(Error::Config(format!(
                        "Invalid country code (expected two letters): {}",
                        value
                    )));
                }
                self.provider.country = value.to_ascii_lowercase();
            }
            ["provider", "language"] => {
                self.provider.language = value.to_string();
            }
            ["provider", "map_id"] => {
                self.provider.map_id = value.to_string();
            }

            ["map", "zoom"] => {
                let zoom: u8 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid zoom value: {}", value))
                })?;
                if zoom > 22 {
                    return Err(Error::Config(format!("Zoom out of range [0, 22]: {}", zoom)));
                }
                self.map.zoom = zoom;
            }

            ["location", "ip_fallback"] => {
                self.location.ip_fallback = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }

            ["session", "ttl_secs"] => {
                self.session.ttl_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid ttl value: {}", value))
                })?;
            }
            ["session", "max_sessions"] => {
                self.session.max_sessions = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid max_sessions value: {}", value))
                })?;
            }

            ["form", "action"] => {
                self.form.action = value.to_string();
            }
            ["form", "method"] => match value.to_lowercase().as_str() {
                "get" | "post" => self.form.method = value.to_lowercase(),
                _ => {
                    return Err(Error::Config(format!("Invalid form method: {}", value)));
                }
            },

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "provider.api_key",
            "provider.country",
            "provider.language",
            "provider.map_id",
            "map.zoom",
            "location.ip_fallback",
            "session.ttl_secs",
            "session.max_sessions",
            "form.action",
            "form.method",
        ]
    }

    /// Effective provider API key
    ///
    /// The configured key wins; otherwise the environment is consulted.
    pub fn api_key(&self) -> Option<String> {
        if !self.provider.api_key.is_empty() {
            return Some(self.provider.api_key.clone());
        }
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.provider.country, "in");
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.server.port, 7878);
        assert!(!config.location.ip_fallback);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("provider.country"), Some("in".to_string()));

        config.set("provider.country", "NP").unwrap();
        assert_eq!(config.get("provider.country"), Some("np".to_string()));

        config.set("map.zoom", "14").unwrap();
        assert_eq!(config.map.zoom, 14);

        config.set("location.ip_fallback", "true").unwrap();
        assert!(config.location.ip_fallback);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_number").is_err());
        assert!(config.set("map.zoom", "40").is_err());
        assert!(config.set("provider.country", "india").is_err());
        assert!(config.set("form.method", "put").is_err());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let mut config = Config::default();
        config.provider.api_key = "configured".to_string();
        assert_eq!(config.api_key().as_deref(), Some("configured"));
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.provider.country = "np".to_string();
            config.map.zoom = 12;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.provider.country, "np");
            assert_eq!(loaded.map.zoom, 12);
        });
    }

    #[test]
    fn test_save_to_unwritable_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let result = Config::default().save_to(&blocker.join("config.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_save_to_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        Config::default().save_to(&path).unwrap();
        let loaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.provider.country, "in");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[provider]\napi_key = \"k\"\n").unwrap();
        assert_eq!(loaded.provider.api_key, "k");
        assert_eq!(loaded.provider.country, "in");
        assert_eq!(loaded.session.ttl_secs, 1800);
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[server]"));
        assert!(toml.contains("[provider]"));
        assert!(toml.contains("[map]"));
        assert!(toml.contains("[session]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7878");
    }

    #[test]
    fn test_available_keys() {
        let keys = Config::available_keys();
        for key in &keys {
            assert!(Config::default().get(key).is_some(), "missing getter for {}", key);
        }
    }
}
