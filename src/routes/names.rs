use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::names::{ClaimNameRequest, NameStatusResponse, OkResponse},
    error::{AppError, ErrorBody},
    routes::extract,
    services::name_service,
    state::SharedState,
};

/// Player name reservation endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/names/claim", post(claim_name))
        .route("/names/{name}", get(name_status).delete(release_name))
}

/// Reserve a player name for the duration of a session.
#[utoipa::path(
    post,
    path = "/names/claim",
    tag = "names",
    request_body = ClaimNameRequest,
    responses(
        (status = 200, description = "Name reserved", body = OkResponse),
        (status = 400, description = "Empty or too long name", body = ErrorBody),
        (status = 409, description = "Name already claimed", body = ErrorBody)
    )
)]
pub async fn claim_name(
    State(state): State<SharedState>,
    extract::Json(payload): extract::Json<ClaimNameRequest>,
) -> Result<Json<OkResponse>, AppError> {
    Ok(Json(name_service::claim(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/names/{name}",
    tag = "names",
    params(("name" = String, Path, description = "Player name to look up")),
    responses((status = 200, description = "Claim status", body = NameStatusResponse))
)]
pub async fn name_status(
    State(state): State<SharedState>,
    extract::Path(name): extract::Path<String>,
) -> Json<NameStatusResponse> {
    Json(name_service::status(&state, name))
}

/// Release a name; unknown names are ignored.
#[utoipa::path(
    delete,
    path = "/names/{name}",
    tag = "names",
    params(("name" = String, Path, description = "Player name to release")),
    responses((status = 204, description = "Name released"))
)]
pub async fn release_name(
    State(state): State<SharedState>,
    extract::Path(name): extract::Path<String>,
) -> StatusCode {
    name_service::release(&state, &name);
    StatusCode::NO_CONTENT
}
