//! HTTP API routes
//!
//! Defines the picker page and all REST API endpoints for the server.

use crate::address::{Coordinates, PlaceResult};
use crate::error::Error;
use crate::form::{select_place, AutocompleteOptions};
use crate::geo::{MapsProvider, Prediction};
use crate::locate::{acquire, Acquisition, DeviceReport, LocationQuery};
use crate::map::{Bounds, MapEvent, MapOptions};
use crate::page::{maps_script_url, BrowserConfig};
use crate::reconcile::{reconcile, ReconcileOutcome, Settlement};
use crate::server::state::AppState;
use crate::session::SessionView;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::info;
use uuid::Uuid;

/// Create the API router
pub fn create_router<P: MapsProvider + 'static>(state: Arc<AppState<P>>) -> Router {
    Router::new()
        .route("/", get(page_handler::<P>))
        .route("/api/status", get(status_handler::<P>))
        .route("/api/map-config", get(map_config_handler::<P>))
        .route("/api/autocomplete", get(autocomplete_handler::<P>))
        .route("/api/reverse", get(reverse_handler::<P>))
        .route("/api/sessions", post(create_session_handler::<P>))
        .route("/api/sessions/:id", get(session_handler::<P>))
        .route("/api/sessions/:id/map/load", post(map_load_handler::<P>))
        .route("/api/sessions/:id/map/unload", post(map_unload_handler::<P>))
        .route("/api/sessions/:id/map/events", post(map_event_handler::<P>))
        .route("/api/sessions/:id/place", post(place_handler::<P>))
        .route("/api/sessions/:id/place/:place_id", post(place_details_handler::<P>))
        .route("/api/sessions/:id/locate", post(locate_handler::<P>))
        .fallback_service(ServeDir::new(static_path()))
        .with_state(state)
}

/// Determine static files path
///
/// Try relative to cwd first, then next to the executable
fn static_path() -> String {
    if std::path::Path::new("static").exists() {
        return "static".to_string();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|| "static".to_string())
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "INVALID_BODY"),
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            Error::Provider(_) | Error::Http(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError::new(status, code, err.to_string())
    }
}

/// Decode a JSON request body
///
/// Used instead of the `Json` extractor so malformed bodies get the
/// `{ error, code }` shape like every other failure.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::from(Error::from(e)))
}

/// Picker page
///
/// GET /?lat=..&lng=..
async fn page_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<LocationQuery>,
) -> Result<Html<String>, ApiError> {
    let view = state.sessions.create(query).await;
    let html = state.pages.render(&view, &state.config)?;
    Ok(Html(html))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Whether a provider API key is available
    pub provider_configured: bool,
    /// Live picker sessions
    pub sessions: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider_configured: state.config.api_key().is_some(),
        sessions: state.sessions.len().await,
        uptime_secs: state.uptime_secs(),
    })
}

/// Map configuration response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfigResponse {
    #[serde(flatten)]
    pub browser: BrowserConfig,
    pub script_url: Option<String>,
}

/// Widget settings for the browser script
///
/// GET /api/map-config
async fn map_config_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
) -> Json<MapConfigResponse> {
    Json(MapConfigResponse {
        browser: BrowserConfig {
            map: MapOptions::from_config(&state.config),
            autocomplete: AutocompleteOptions::from_config(&state.config),
        },
        script_url: maps_script_url(&state.config),
    })
}

/// Autocomplete query
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub input: String,
}

/// Autocomplete response
#[derive(Debug, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub predictions: Vec<Prediction>,
}

/// Place suggestions, restricted to the configured country
///
/// GET /api/autocomplete?input=..
async fn autocomplete_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<AutocompleteResponse>, ApiError> {
    let predictions = state.provider.autocomplete(&query.input).await?;
    Ok(Json(AutocompleteResponse { predictions }))
}

/// Reverse geocode query
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Stateless reverse geocode
///
/// GET /api/reverse?lat=..&lng=..
async fn reverse_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<ReconcileOutcome>, ApiError> {
    let coords = Coordinates::new(query.lat, query.lng);
    coords.validate()?;
    Ok(Json(reconcile(&state.provider, coords).await))
}

/// Open a picker session
///
/// POST /api/sessions?lat=..&lng=..
async fn create_session_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<LocationQuery>,
) -> (StatusCode, Json<SessionView>) {
    let view = state.sessions.create(query).await;
    (StatusCode::CREATED, Json(view))
}

/// Current session snapshot
///
/// GET /api/sessions/:id
async fn session_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.view(id).await?))
}

/// Map load response
#[derive(Debug, Serialize, Deserialize)]
pub struct MapLoadResponse {
    /// Viewport to fit, if a coordinate is set
    pub bounds: Option<Bounds>,
    pub settlement: Option<Settlement>,
    pub session: SessionView,
}

/// Map mounted in the browser
///
/// POST /api/sessions/:id/map/load
async fn map_load_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MapLoadResponse>, ApiError> {
    let (bounds, ticket) = state.sessions.update(id, |s| s.load_map()).await?;

    let settlement = match ticket {
        Some(ticket) => Some(state.sessions.reconcile(&state.provider, id, ticket).await?),
        None => None,
    };

    Ok(Json(MapLoadResponse {
        bounds,
        settlement,
        session: state.sessions.view(id).await?,
    }))
}

/// Map unmounted in the browser
///
/// POST /api/sessions/:id/map/unload
async fn map_unload_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state.sessions.update(id, |s| s.unload_map()).await?;
    Ok(Json(state.sessions.view(id).await?))
}

/// Response to an event that may reconcile
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    /// None when the event carried nothing to reconcile
    pub settlement: Option<Settlement>,
    pub session: SessionView,
}

/// Map drag-end, click or zoom change
///
/// POST /api/sessions/:id/map/events
async fn map_event_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<EventResponse>, ApiError> {
    let event: MapEvent = parse_body(&body)?;
    let ticket = state.sessions.update(id, |s| s.map_event(&event)).await?;

    let settlement = match ticket {
        Some(ticket) => Some(state.sessions.reconcile(&state.provider, id, ticket).await?),
        None => None,
    };

    Ok(Json(EventResponse {
        settlement,
        session: state.sessions.view(id).await?,
    }))
}

/// Autocomplete selection committed in the browser
///
/// POST /api/sessions/:id/place
async fn place_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<SessionView>, ApiError> {
    let place: PlaceResult = parse_body(&body)?;
    let address = select_place(&place);
    state.sessions.update(id, |s| s.replace(address)).await?;
    Ok(Json(state.sessions.view(id).await?))
}

/// Autocomplete selection by place id, resolved server-side
///
/// POST /api/sessions/:id/place/:place_id
async fn place_details_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path((id, place_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, ApiError> {
    // fail fast on an unknown session before calling the provider
    state.sessions.view(id).await?;

    let place = state
        .provider
        .place_details(&place_id)
        .await?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "PLACE_NOT_FOUND",
                format!("Place not found: {}", place_id),
            )
        })?;

    let address = select_place(&place);
    state.sessions.update(id, |s| s.replace(address)).await?;
    Ok(Json(state.sessions.view(id).await?))
}

/// Locate response
#[derive(Debug, Serialize, Deserialize)]
pub struct LocateResponse {
    pub acquisition: Acquisition,
    pub settlement: Option<Settlement>,
    pub session: SessionView,
}

/// Detect location
///
/// POST /api/sessions/:id/locate
///
/// Body is an optional device report from the browser. Without one the
/// server falls back to IP geolocation when enabled.
async fn locate_handler<P: MapsProvider + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<LocateResponse>, ApiError> {
    let report: Option<DeviceReport> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(parse_body(&body)?)
    };

    let query = state.sessions.update(id, |s| s.query.clone()).await?;

    let acquisition = match &report {
        Some(report) => acquire(&query, report.as_source()).await,
        None => acquire(&query, state.ip_locator.as_ref()).await,
    };
    info!(%id, ?acquisition, "location acquired");

    let ticket = state
        .sessions
        .update(id, |s| s.apply_acquisition(&acquisition))
        .await?;

    let settlement = match ticket {
        Some(ticket) => Some(state.sessions.reconcile(&state.provider, id, ticket).await?),
        None => None,
    };

    Ok(Json(LocateResponse {
        acquisition,
        settlement,
        session: state.sessions.view(id).await?,
    }))
}
