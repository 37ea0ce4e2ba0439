//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::constants::api::API_KEY_ENV;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "provider.country")
    pub key: Option<String>,

    /// Value to set; omit to print the current value
    pub value: Option<String>,

    /// Print the config file location
    #[arg(long, conflicts_with = "reset")]
    pub path: bool,

    /// Overwrite the config file with defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key.as_deref(), args.value.as_deref()) {
        (None, None) => show_all_config(&config),
        (Some(key), None) => {
            let value = config.get(key).ok_or_else(|| unknown_key(key))?;
            println!("{}", value);
        }
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            // never echo the key itself back
            if key == "provider.api_key" {
                println!("{} updated", key);
            } else {
                println!("{} = {}", key, value);
            }
        }
        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {}\nAvailable keys:\n  {}",
        key,
        Config::available_keys().join("\n  ")
    ))
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    println!("[provider]");
    if config.provider.api_key.is_empty() {
        if config.api_key().is_some() {
            println!("api_key = \"\" # using {}", API_KEY_ENV);
        } else {
            println!("api_key = \"\" # not configured");
        }
    } else {
        println!("api_key = \"***\" # configured");
    }
    println!("country = \"{}\"", config.provider.country);
    println!("language = \"{}\"", config.provider.language);
    println!("map_id = \"{}\"", config.provider.map_id);
    println!();

    println!("[map]");
    println!("zoom = {}", config.map.zoom);
    println!();

    println!("[location]");
    println!("ip_fallback = {}", config.location.ip_fallback);
    println!();

    println!("[session]");
    println!("ttl_secs = {}", config.session.ttl_secs);
    println!("max_sessions = {}", config.session.max_sessions);
    println!();

    println!("[form]");
    println!("action = \"{}\"", config.form.action);
    println!("method = \"{}\"", config.form.method);
}
