//! pickup-address: map-based pickup address picker
//!
//! A library and web service for choosing a pickup address on a map. The
//! address comes from URL coordinates, device geolocation, a places search
//! or a map drag, is completed through reverse geocoding, and is submitted
//! with the enclosing form as six hidden fields.
//!
//! ## Features
//!
//! - Address extraction from place results and geocode components
//! - Reverse geocode reconciliation where the latest request wins
//! - Location acquisition with query-parameter precedence
//! - Per-page picker sessions behind an HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use pickup_address::address::Coordinates;
//! use pickup_address::form::hidden_fields;
//! use pickup_address::locate::LocationQuery;
//!
//! let query = LocationQuery::new("27.7", "85.3");
//! let address = query.initial_address();
//! assert_eq!(address.coords, Some(Coordinates::new(27.7, 85.3)));
//!
//! for field in hidden_fields(&address) {
//!     println!("{} = {}", field.name, field.value);
//! }
//! ```

pub mod address;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod form;
pub mod geo;
pub mod locate;
pub mod map;
pub mod page;
pub mod reconcile;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use address::{Address, Coordinates, PlaceResult};
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{GeocodeStatus, MapsProvider};
pub use session::{PickerSession, SessionStore, SessionView};
