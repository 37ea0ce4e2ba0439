//! Search command handler
//!
//! Lists autocomplete predictions and optionally resolves one into the
//! address a selection would produce.

use crate::cli::{print_address, print_json};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::select_place;
use crate::geo::{get_provider, MapsProvider};
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Partial address
    pub input: String,

    /// Resolve the Nth prediction (1-based)
    #[arg(long, short = 's')]
    pub select: Option<usize>,

    /// Restrict to a country (two-letter code)
    #[arg(long, short = 'c')]
    pub country: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(country) = &args.country {
        config.set("provider.country", country)?;
    }

    let provider = get_provider(&config);
    if !provider.has_key() {
        return Err(Error::Config(format!(
            "No provider API key; set provider.api_key or {}",
            crate::constants::api::API_KEY_ENV
        )));
    }

    let predictions = provider.autocomplete(&args.input).await?;

    let Some(n) = args.select else {
        if args.json {
            return print_json(&predictions);
        }
        if predictions.is_empty() {
            println!("No matches for \"{}\"", args.input);
        }
        for (i, prediction) in predictions.iter().enumerate() {
            println!("{:>2}. {}", i + 1, prediction.description);
        }
        return Ok(());
    };

    let prediction = n
        .checked_sub(1)
        .and_then(|i| predictions.get(i))
        .ok_or_else(|| {
            Error::Provider(format!(
                "No prediction #{} ({} returned)",
                n,
                predictions.len()
            ))
        })?;

    let place = provider
        .place_details(&prediction.place_id)
        .await?
        .ok_or_else(|| Error::Provider(format!("Place not found: {}", prediction.place_id)))?;
    let address = select_place(&place);

    if args.json {
        return print_json(&address);
    }

    println!("{}", prediction.description);
    println!();
    print_address(&address);
    Ok(())
}
