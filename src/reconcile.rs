//! Geocode reconciliation
//!
//! Derives address text from a coordinate through reverse geocoding.
//! Requests are numbered; a result is applied only if no newer request was
//! issued after it, so out-of-order responses cannot overwrite newer state.

use crate::address::extract::component_fields;
use crate::address::{Address, Coordinates};
use crate::geo::{GeocodeResponse, GeocodeStatus, MapsProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of one reverse geocode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Resolved { address: Address },
    /// Nothing usable came back; the caller keeps its address
    Dropped { status: Option<GeocodeStatus> },
}

impl ReconcileOutcome {
    pub fn address(&self) -> Option<&Address> {
        match self {
            Self::Resolved { address } => Some(address),
            Self::Dropped { .. } => None,
        }
    }
}

/// Build the address for a reverse geocode response
///
/// Only an OK response with at least one result produces an address. The
/// queried coordinate is kept as-is; text comes from the first result.
pub fn address_from_geocode(coords: Coordinates, response: &GeocodeResponse) -> Option<Address> {
    if !response.status.is_ok() {
        return None;
    }
    let first = response.results.first()?;
    let fields = component_fields(&first.address_components);

    Some(Address {
        coords: Some(coords),
        name: first.formatted_address.clone(),
        city: fields.city.unwrap_or_default(),
        state: fields.state.unwrap_or_default(),
        pincode: fields.pincode.unwrap_or_default(),
    })
}

/// Reverse geocode a coordinate into an address
pub async fn reconcile<P: MapsProvider>(provider: &P, coords: Coordinates) -> ReconcileOutcome {
    match provider.reverse_geocode(coords).await {
        Ok(response) => match address_from_geocode(coords, &response) {
            Some(address) => ReconcileOutcome::Resolved { address },
            None => {
                warn!(
                    lat = coords.lat,
                    lng = coords.lng,
                    status = %response.status,
                    "reverse geocode returned nothing usable"
                );
                ReconcileOutcome::Dropped {
                    status: Some(response.status),
                }
            }
        },
        Err(e) => {
            warn!(lat = coords.lat, lng = coords.lng, "reverse geocode failed: {}", e);
            ReconcileOutcome::Dropped { status: None }
        }
    }
}

/// A numbered in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub generation: u64,
    pub coords: Coordinates,
}

/// Monotonic request counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestGeneration(u64);

impl RequestGeneration {
    /// Number a new request
    pub fn issue(&mut self, coords: Coordinates) -> Ticket {
        self.bump();
        Ticket {
            generation: self.0,
            coords,
        }
    }

    /// Invalidate everything in flight
    ///
    /// Called whenever the address is replaced by anything other than a
    /// settled ticket.
    pub fn bump(&mut self) {
        self.0 += 1;
    }

    pub fn current(&self) -> u64 {
        self.0
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.0
    }
}

/// What settling a ticket did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Applied,
    /// A newer request was issued; result discarded
    Stale,
    /// The response carried nothing usable; address unchanged
    Dropped,
}

/// Apply a finished request to the current address
pub fn settle(
    address: &mut Address,
    generation: &RequestGeneration,
    ticket: &Ticket,
    outcome: ReconcileOutcome,
) -> Settlement {
    if !generation.is_current(ticket) {
        debug!(
            ticket = ticket.generation,
            current = generation.current(),
            "discarding stale reverse geocode"
        );
        return Settlement::Stale;
    }

    match outcome {
        ReconcileOutcome::Resolved { address: resolved } => {
            *address = resolved;
            Settlement::Applied
        }
        ReconcileOutcome::Dropped { .. } => Settlement::Dropped,
    }
}
