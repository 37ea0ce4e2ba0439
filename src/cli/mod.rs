//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod locate;
pub mod reverse;
pub mod search;
pub mod serve;

use crate::address::Address;
use crate::error::Result;
use clap::{Parser, Subcommand};

/// Pickup address picker
#[derive(Parser)]
#[command(name = "pickup-address")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Reverse geocode a coordinate into an address
    Reverse(reverse::ReverseArgs),

    /// Search places by partial address
    Search(search::SearchArgs),

    /// Acquire the current location
    Locate(locate::LocateArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Reverse(args) => reverse::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Locate(args) => locate::run(args).await,
    }
}

/// Print an address as the form would submit it
pub(crate) fn print_address(address: &Address) {
    for field in crate::form::hidden_fields(address) {
        println!("{:<18} {}", field.name, field.value);
    }
}

/// Print a value as pretty JSON
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
