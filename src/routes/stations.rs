use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use indexmap::IndexMap;

use crate::{
    dto::stations::{
        RemoteReportRequest, StationReportResponse, StationStatusRequest, VictoryResponse,
    },
    error::{AppError, ErrorBody},
    routes::extract,
    services::station_service,
    state::{SharedState, stations::StationStatus},
};

/// Station reporting endpoints used by the local reader and the satellites.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stations", get(list_stations))
        .route("/stations/victory", get(victory))
        .route("/stations/remote", post(report_remote))
        .route("/stations/{id}/status", post(report_status))
}

/// Current status of every station, in declaration order.
#[utoipa::path(
    get,
    path = "/stations",
    tag = "stations",
    responses((status = 200, description = "Station statuses keyed by station id", body = HashMap<String, StationStatus>))
)]
pub async fn list_stations(State(state): State<SharedState>) -> Json<IndexMap<String, StationStatus>> {
    Json(station_service::snapshot(&state))
}

#[utoipa::path(
    get,
    path = "/stations/victory",
    tag = "stations",
    responses((status = 200, description = "Whether every station is correct", body = VictoryResponse))
)]
pub async fn victory(State(state): State<SharedState>) -> Json<VictoryResponse> {
    Json(station_service::victory(&state))
}

/// Report a status for one station.
#[utoipa::path(
    post,
    path = "/stations/{id}/status",
    tag = "stations",
    params(("id" = String, Path, description = "Station identifier")),
    request_body = StationStatusRequest,
    responses(
        (status = 200, description = "Report processed; `applied` is false for illegal transitions", body = StationReportResponse),
        (status = 400, description = "Malformed report", body = ErrorBody)
    )
)]
pub async fn report_status(
    State(state): State<SharedState>,
    extract::Path(id): extract::Path<String>,
    extract::Json(payload): extract::Json<StationStatusRequest>,
) -> Result<Json<StationReportResponse>, AppError> {
    Ok(Json(station_service::report_status(
        &state,
        &id,
        payload.status,
    )?))
}

/// Report from a satellite reader, carrying either a status or a raw tag id.
#[utoipa::path(
    post,
    path = "/stations/remote",
    tag = "stations",
    request_body = RemoteReportRequest,
    responses(
        (status = 200, description = "Report processed", body = StationReportResponse),
        (status = 400, description = "Neither status nor tag provided", body = ErrorBody)
    )
)]
pub async fn report_remote(
    State(state): State<SharedState>,
    extract::Json(payload): extract::Json<RemoteReportRequest>,
) -> Result<Json<StationReportResponse>, AppError> {
    Ok(Json(station_service::report_remote(&state, payload)?))
}
