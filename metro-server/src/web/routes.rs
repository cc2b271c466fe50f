//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::domain::{PlatformId, ServiceTime};
use crate::network::{NetworkError, is_connected};
use crate::planner::{PlanError, PlanRequest, plan};
use crate::timetable::{StoreError, TimetableStore};

use super::dto::*;
use super::state::AppState;

/// Maximum number of autocomplete suggestions.
const AUTOCOMPLETE_LIMIT: usize = 10;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/itinerary", get(itinerary))
        .route("/api/network", get(network))
        .route("/api/stop/:id", get(stop))
        .route("/api/autocomplete", get(autocomplete))
        .route("/api/lines/:name/stations", get(line_stations))
        .route("/api/stops", get(stops))
        .route("/api/routes-colors", get(route_colors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Plan itineraries between two platforms.
async fn itinerary(
    State(state): State<AppState>,
    Query(req): Query<ItineraryRequest>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let from = parse_platform(&req.from)?;
    let to = parse_platform(&req.to)?;

    let mut request = PlanRequest::new(from, to);
    if let Some(departure) = req.departure.as_deref().filter(|d| !d.is_empty()) {
        let time = ServiceTime::parse_requested(departure).map_err(|e| AppError::BadRequest {
            message: format!("Invalid departure time: {e}"),
        })?;
        request = request.departing_at(time);
    }

    let timed = plan(&state.network, state.store.as_ref(), &state.config, &request).await?;
    if timed.is_empty() {
        return Err(AppError::NotFound {
            message: format!("No route from {} to {}", request.from, request.to),
        });
    }

    Ok(Json(ItineraryResponse {
        itineraries: timed.iter().map(ItineraryResult::from_timed).collect(),
    }))
}

/// The full network, or its spanning tree, for visualisation.
async fn network(
    State(state): State<AppState>,
    Query(req): Query<NetworkRequest>,
) -> Result<Json<NetworkResponse>, AppError> {
    let graph = if req.mst {
        state.network.mst(state.store.as_ref(), &state.config).await?
    } else {
        state.network.network(state.store.as_ref(), &state.config).await?
    };

    let connected = is_connected(&graph);
    Ok(Json(NetworkResponse::from_network(&graph, connected)))
}

/// Details of one platform.
async fn stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StopInfoResponse>, AppError> {
    let id = parse_platform(&id)?;
    let info = state
        .store
        .stop(&id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown stop: {id}"),
        })?;

    Ok(Json(StopInfoResponse::from(info)))
}

/// Stop names starting with the query.
async fn autocomplete(
    State(state): State<AppState>,
    Query(req): Query<AutocompleteRequest>,
) -> Result<Json<AutocompleteResponse>, AppError> {
    let query = req.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::BadRequest {
            message: "Missing query parameter \"q\"".into(),
        });
    }

    let names = state
        .store
        .search_stop_names(query, AUTOCOMPLETE_LIMIT)
        .await?;
    Ok(Json(AutocompleteResponse { names }))
}

/// Stations along a line, by public line name.
async fn line_stations(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LineStationsResponse>, AppError> {
    let line = state
        .store
        .line_stations(&name)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown line: {name}"),
        })?;

    Ok(Json(LineStationsResponse::from(line)))
}

/// Every served stop name, for the map.
async fn stops(State(state): State<AppState>) -> Result<Json<StopsResponse>, AppError> {
    let stops = state.store.stops().await?;
    Ok(Json(StopsResponse {
        stops: stops.into_iter().map(StopSummaryResult::from).collect(),
    }))
}

/// Background colour of each line.
async fn route_colors(
    State(state): State<AppState>,
) -> Result<Json<Vec<RouteColorResult>>, AppError> {
    let colors = state.store.route_colors().await?;
    Ok(Json(colors.into_iter().map(RouteColorResult::from).collect()))
}

fn parse_platform(raw: &str) -> Result<PlatformId, AppError> {
    PlatformId::parse(raw).map_err(|_| AppError::BadRequest {
        message: format!("Invalid platform id: {raw:?}"),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::UnknownPlatform(_) => AppError::NotFound {
                message: e.to_string(),
            },
            PlanError::Network(e) => e.into(),
            PlanError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            debug!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
