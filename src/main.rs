//! pickup-address CLI entry point
//!
//! Map-based pickup address picker - CLI + web app

use pickup_address::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
