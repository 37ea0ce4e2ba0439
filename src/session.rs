//! Picker sessions
//!
//! One session per rendered picker page. A session owns the page's single
//! `Address`, its map error slot and its map view. The address is only ever
//! replaced whole.

use crate::address::{Address, Coordinates};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::form::{hidden_fields, HiddenField};
use crate::geo::MapsProvider;
use crate::locate::{Acquisition, LocationQuery};
use crate::map::{overlay, Bounds, MapEvent, MapState, MapView, Overlay};
use crate::reconcile::{reconcile, settle, ReconcileOutcome, RequestGeneration, Settlement, Ticket};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Longest accepted session lifetime (one year)
const MAX_TTL_SECS: u64 = 365 * 24 * 3600;

/// State behind one picker page
#[derive(Debug, Clone)]
pub struct PickerSession {
    pub id: Uuid,
    /// Query parameters the page was opened with
    pub query: LocationQuery,
    address: Address,
    map_error: Option<String>,
    map: MapView,
    generation: RequestGeneration,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serializable snapshot of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub address: Address,
    pub map_error: Option<String>,
    pub map: MapState,
    pub overlay: Overlay,
    pub hidden_fields: Vec<HiddenField>,
}

impl PickerSession {
    /// A fresh session; the address comes from the query parameters
    pub fn new(query: LocationQuery) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            address: query.initial_address(),
            query,
            map_error: None,
            map: MapView::new(),
            generation: RequestGeneration::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn map_error(&self) -> Option<&str> {
        self.map_error.as_deref()
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    /// Replace the address outright
    ///
    /// Any reverse geocode still in flight is invalidated.
    pub fn replace(&mut self, address: Address) {
        self.generation.bump();
        self.address = address;
    }

    /// Start a reverse geocode for a coordinate
    pub fn issue(&mut self, coords: Coordinates) -> Ticket {
        self.generation.issue(coords)
    }

    /// Apply a finished reverse geocode
    pub fn settle(&mut self, ticket: &Ticket, outcome: ReconcileOutcome) -> Settlement {
        settle(&mut self.address, &self.generation, ticket, outcome)
    }

    /// Mount the map
    ///
    /// Returns the fitted bounds and, when a coordinate is already set, the
    /// ticket for its initial reconciliation.
    pub fn load_map(&mut self) -> (Option<Bounds>, Option<Ticket>) {
        let coords = self.address.coords;
        let bounds = self.map.load(coords);
        let ticket = coords.map(|c| self.issue(c));
        (bounds, ticket)
    }

    pub fn unload_map(&mut self) {
        self.map.unload();
    }

    /// Handle a map widget event
    pub fn map_event(&mut self, event: &MapEvent) -> Option<Ticket> {
        let coords = self.map.target(event)?;
        Some(self.issue(coords))
    }

    /// Apply a location acquisition
    ///
    /// Success replaces the address (text cleared) and clears the error
    /// slot; failure only sets the error slot. The returned ticket, if any,
    /// reconciles the new coordinate when the map is loaded.
    pub fn apply_acquisition(&mut self, acquisition: &Acquisition) -> Option<Ticket> {
        if let Some(error) = acquisition.error() {
            self.map_error = Some(error.message().to_string());
            return None;
        }

        let address = acquisition.address()?;
        let coords = address.coords;
        self.replace(address);
        self.map_error = None;

        if self.map.is_loaded() {
            coords.map(|c| self.issue(c))
        } else {
            None
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            address: self.address.clone(),
            map_error: self.map_error.clone(),
            map: self.map.state(),
            overlay: overlay(&self.address),
            hidden_fields: hidden_fields(&self.address),
        }
    }
}

/// All live sessions
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, PickerSession>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let ttl_secs = config.ttl_secs.min(MAX_TTL_SECS) as i64;
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
            max_sessions: config.max_sessions.max(1),
        }
    }

    /// Open a session for a page load
    pub async fn create(&self, query: LocationQuery) -> SessionView {
        let session = PickerSession::new(query);
        let view = session.view();

        let mut sessions = self.sessions.write().await;
        Self::prune_expired(&mut sessions, self.ttl);

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.updated_at)
                .map(|s| s.id);
            if let Some(id) = oldest {
                debug!(%id, "evicting oldest session");
                sessions.remove(&id);
            }
        }

        sessions.insert(session.id, session);
        info!(id = %view.id, has_coords = view.address.coords.is_some(), "session created");
        view
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(PickerSession::view)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// Run `f` against a session under the write lock
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut PickerSession) -> R) -> Result<R> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        session.updated_at = Utc::now();
        Ok(f(session))
    }

    /// Reverse geocode a ticket and settle it on the session
    ///
    /// The provider is called without holding the lock, so requests for the
    /// same session may overlap; settling discards all but the newest.
    pub async fn reconcile<P: MapsProvider>(
        &self,
        provider: &P,
        id: Uuid,
        ticket: Ticket,
    ) -> Result<Settlement> {
        let outcome = reconcile(provider, ticket.coords).await;
        let settlement = self.update(id, |s| s.settle(&ticket, outcome)).await?;
        debug!(%id, generation = ticket.generation, ?settlement, "reconciled");
        Ok(settlement)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn prune_expired(sessions: &mut HashMap<Uuid, PickerSession>, ttl: Duration) {
        let cutoff = Utc::now() - ttl;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= cutoff);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "pruned expired sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeocodeStatus;
    use crate::locate::{acquire, DeviceReport};
    use crate::reconcile::testing::FakeProvider;
    use std::sync::Arc;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig::default())
    }

    #[tokio::test]
    async fn test_create_from_query() {
        let store = store();
        let view = store.create(LocationQuery::new("27.7", "85.3")).await;

        assert_eq!(view.address.coords, Some(Coordinates::new(27.7, 85.3)));
        assert_eq!(view.address.name, "");
        assert_eq!(view.overlay, Overlay::CenterMarker);
        assert_eq!(view.map, MapState::NotLoaded);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = store();
        let result = store.view(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_reconciles_initial_coordinate() {
        let store = store();
        let provider = FakeProvider::ok();
        let view = store.create(LocationQuery::new("12.9716", "77.5946")).await;

        let (bounds, ticket) = store.update(view.id, |s| s.load_map()).await.unwrap();
        assert!(bounds.is_some());

        let settlement = store
            .reconcile(&provider, view.id, ticket.unwrap())
            .await
            .unwrap();
        assert_eq!(settlement, Settlement::Applied);

        let view = store.view(view.id).await.unwrap();
        assert_eq!(view.address.coords, Some(Coordinates::new(12.9716, 77.5946)));
        assert_eq!(view.address.city, "Bengaluru");
        assert_eq!(view.hidden_fields[3].value, "Bengaluru");
    }

    #[tokio::test]
    async fn test_load_without_coordinate_has_no_ticket() {
        let store = store();
        let view = store.create(LocationQuery::default()).await;

        let (bounds, ticket) = store.update(view.id, |s| s.load_map()).await.unwrap();
        assert!(bounds.is_none());
        assert!(ticket.is_none());
    }

    #[tokio::test]
    async fn test_failed_geocode_keeps_address() {
        let store = store();
        let provider = FakeProvider::with_status(GeocodeStatus::ZeroResults);
        let view = store.create(LocationQuery::new("10", "20")).await;

        let ticket = store
            .update(view.id, |s| {
                s.load_map();
                s.map_event(&MapEvent::Click {
                    lat_lng: Some(Coordinates::new(11.0, 21.0)),
                })
            })
            .await
            .unwrap()
            .unwrap();

        let settlement = store.reconcile(&provider, view.id, ticket).await.unwrap();
        assert_eq!(settlement, Settlement::Dropped);

        let after = store.view(view.id).await.unwrap();
        assert_eq!(after.address, view.address);
        assert!(after.map_error.is_none());
    }

    #[tokio::test]
    async fn test_out_of_order_responses_keep_latest_request() {
        let store = Arc::new(store());
        let provider = Arc::new(FakeProvider::ok());
        let view = store.create(LocationQuery::default()).await;
        store.update(view.id, |s| s.load_map()).await.unwrap();

        provider.delay_for(1.0, std::time::Duration::from_millis(80));

        let first = store
            .update(view.id, |s| {
                s.map_event(&MapEvent::DragEnd {
                    center: Some(Coordinates::new(1.0, 1.0)),
                })
            })
            .await
            .unwrap()
            .unwrap();
        let second = store
            .update(view.id, |s| {
                s.map_event(&MapEvent::DragEnd {
                    center: Some(Coordinates::new(2.0, 2.0)),
                })
            })
            .await
            .unwrap()
            .unwrap();

        let slow = {
            let store = Arc::clone(&store);
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { store.reconcile(provider.as_ref(), view.id, first).await })
        };
        let fast = store.reconcile(provider.as_ref(), view.id, second).await.unwrap();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(fast, Settlement::Applied);
        assert_eq!(slow, Settlement::Stale);

        let after = store.view(view.id).await.unwrap();
        assert_eq!(after.address.coords, Some(Coordinates::new(2.0, 2.0)));
    }

    #[tokio::test]
    async fn test_permission_denied_sets_error_only() {
        let store = store();
        let view = store.create(LocationQuery::default()).await;
        let before = view.address.clone();

        let report = DeviceReport::Error { code: 1 };
        let acquisition = acquire(&LocationQuery::default(), report.as_source()).await;
        let ticket = store
            .update(view.id, |s| s.apply_acquisition(&acquisition))
            .await
            .unwrap();

        assert!(ticket.is_none());
        let after = store.view(view.id).await.unwrap();
        assert_eq!(
            after.map_error.as_deref(),
            Some("You have not provided location access")
        );
        assert_eq!(after.address, before);
    }

    #[tokio::test]
    async fn test_permission_denied_keeps_clicked_address() {
        let store = store();
        let provider = FakeProvider::ok();
        let view = store.create(LocationQuery::default()).await;

        let ticket = store
            .update(view.id, |s| {
                s.load_map();
                s.map_event(&MapEvent::Click {
                    lat_lng: Some(Coordinates::new(12.9716, 77.5946)),
                })
            })
            .await
            .unwrap()
            .unwrap();
        store.reconcile(&provider, view.id, ticket).await.unwrap();
        let before = store.view(view.id).await.unwrap().address;
        assert!(before.has_coords());

        let report = DeviceReport::Error { code: 1 };
        let acquisition = acquire(&LocationQuery::default(), report.as_source()).await;
        let ticket = store
            .update(view.id, |s| s.apply_acquisition(&acquisition))
            .await
            .unwrap();

        assert!(ticket.is_none());
        let after = store.view(view.id).await.unwrap();
        assert_eq!(after.address, before);
        assert_eq!(after.overlay, Overlay::CenterMarker);
        assert_eq!(
            after.map_error.as_deref(),
            Some("You have not provided location access")
        );
    }

    #[tokio::test]
    async fn test_device_position_replaces_address() {
        let store = store();
        let view = store.create(LocationQuery::default()).await;
        store.update(view.id, |s| s.load_map()).await.unwrap();

        let report = DeviceReport::Position { lat: 19.0, lng: 72.8 };
        let acquisition = acquire(&LocationQuery::default(), report.as_source()).await;
        let ticket = store
            .update(view.id, |s| s.apply_acquisition(&acquisition))
            .await
            .unwrap();

        assert_eq!(ticket.map(|t| t.coords), Some(Coordinates::new(19.0, 72.8)));
        let after = store.view(view.id).await.unwrap();
        assert_eq!(after.address, Address::at(Coordinates::new(19.0, 72.8)));
    }

    #[tokio::test]
    async fn test_replace_invalidates_in_flight() {
        let store = store();
        let provider = FakeProvider::ok();
        let view = store.create(LocationQuery::new("10", "20")).await;

        let (_, ticket) = store.update(view.id, |s| s.load_map()).await.unwrap();
        let chosen = Address {
            name: "Chosen place".to_string(),
            ..Address::at(Coordinates::new(30.0, 40.0))
        };
        store
            .update(view.id, |s| s.replace(chosen.clone()))
            .await
            .unwrap();

        let settlement = store
            .reconcile(&provider, view.id, ticket.unwrap())
            .await
            .unwrap();
        assert_eq!(settlement, Settlement::Stale);
        assert_eq!(store.view(view.id).await.unwrap().address, chosen);
    }

    #[tokio::test]
    async fn test_max_sessions_evicts_oldest() {
        let store = SessionStore::new(&SessionConfig {
            ttl_secs: 60,
            max_sessions: 2,
        });

        let first = store.create(LocationQuery::default()).await;
        store.create(LocationQuery::default()).await;
        store.create(LocationQuery::default()).await;

        assert_eq!(store.len().await, 2);
        assert!(store.view(first.id).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned() {
        let store = SessionStore::new(&SessionConfig {
            ttl_secs: 0,
            max_sessions: 10,
        });

        let first = store.create(LocationQuery::default()).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.create(LocationQuery::default()).await;

        assert!(store.view(first.id).await.is_err());
    }
}
