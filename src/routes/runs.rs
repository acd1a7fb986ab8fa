use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::runs::{RankingItem, RankingQuery, RecordRunRequest, RecordRunResponse},
    error::{AppError, ErrorBody},
    routes::extract,
    services::leaderboard_service,
    state::SharedState,
};

/// Leaderboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/runs", post(record_run))
        .route("/rankings", get(rankings))
}

/// Record a completed run submitted outside the session flow.
#[utoipa::path(
    post,
    path = "/runs",
    tag = "runs",
    request_body = RecordRunRequest,
    responses(
        (status = 200, description = "Run recorded", body = RecordRunResponse),
        (status = 400, description = "Invalid name or malformed time", body = ErrorBody),
        (status = 503, description = "Leaderboard unavailable", body = ErrorBody)
    )
)]
pub async fn record_run(
    State(state): State<SharedState>,
    extract::Json(payload): extract::Json<RecordRunRequest>,
) -> Result<Json<RecordRunResponse>, AppError> {
    let run = leaderboard_service::record_run(&state, payload).await?;
    Ok(Json(RecordRunResponse { id: run.id }))
}

/// Fastest runs first; ties keep recording order.
#[utoipa::path(
    get,
    path = "/rankings",
    tag = "runs",
    params(RankingQuery),
    responses(
        (status = 200, description = "Ranked runs", body = [RankingItem]),
        (status = 503, description = "Leaderboard unavailable", body = ErrorBody)
    )
)]
pub async fn rankings(
    State(state): State<SharedState>,
    extract::Query(query): extract::Query<RankingQuery>,
) -> Result<Json<Vec<RankingItem>>, AppError> {
    Ok(Json(leaderboard_service::rankings(&state, query).await?))
}
