//! Reverse command handler
//!
//! Reverse geocodes a coordinate the same way a map drag would.

use crate::address::Coordinates;
use crate::cli::{print_address, print_json};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::get_provider;
use crate::reconcile::{reconcile, ReconcileOutcome};
use clap::Args;

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Latitude
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude
    #[arg(allow_negative_numbers = true)]
    pub lng: f64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the reverse command
pub async fn run(args: ReverseArgs) -> Result<()> {
    let config = Config::load()?;
    let coords = Coordinates::new(args.lat, args.lng);
    coords.validate()?;

    let provider = get_provider(&config);
    if !provider.has_key() {
        return Err(Error::Config(format!(
            "No provider API key; set provider.api_key or {}",
            crate::constants::api::API_KEY_ENV
        )));
    }

    let outcome = reconcile(&provider, coords).await;

    if args.json {
        return print_json(&outcome);
    }

    match &outcome {
        ReconcileOutcome::Resolved { address } => print_address(address),
        ReconcileOutcome::Dropped { status: Some(status) } => {
            println!("No address for {}, {} ({})", coords.lat, coords.lng, status);
        }
        ReconcileOutcome::Dropped { status: None } => {
            println!("No address for {}, {} (request failed)", coords.lat, coords.lng);
        }
    }

    Ok(())
}
