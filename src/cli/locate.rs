//! Locate command handler
//!
//! Runs location acquisition from the command line. Query coordinates win;
//! otherwise the position comes from IP geolocation.

use crate::cli::{print_address, print_json};
use crate::error::Result;
use crate::geo::get_ip_locator;
use crate::locate::{acquire, Acquisition, LocationQuery};
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Latitude query parameter
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<String>,

    /// Longitude query parameter
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<String>,

    /// Skip the cached IP location
    #[arg(long)]
    pub no_cache: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    let query = LocationQuery {
        lat: args.lat,
        lng: args.lng,
    };

    let locator = get_ip_locator();
    if args.no_cache {
        locator.clear_cache();
    }

    let acquisition = acquire(&query, Some(&locator)).await;

    if args.json {
        return print_json(&acquisition);
    }

    match &acquisition {
        Acquisition::Query { .. } => println!("Source: query parameters"),
        Acquisition::Device { .. } => println!("Source: IP geolocation"),
        Acquisition::Failed { error } => {
            println!("{}", error.message());
            return Ok(());
        }
    }

    if let Some(address) = acquisition.address() {
        print_address(&address);
    }
    Ok(())
}
