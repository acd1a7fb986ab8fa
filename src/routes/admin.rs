use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use crate::{
    dao::models::RunId,
    dto::admin::{AdminDeleteResponse, AdminEditResponse, AdminRunItem, AdminRunRow},
    error::{AppError, ErrorBody},
    routes::extract,
    services::admin_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Operator endpoints for leaderboard maintenance and floor reset.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/runs",
            get(list_runs).post(edit_runs).delete(clear_runs),
        )
        .route("/admin/runs/delete", post(delete_runs))
        .route("/admin/reset", post(reset_floor))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Every recorded run, ordered by id.
#[utoipa::path(
    get,
    path = "/admin/runs",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Operator token, required when one is configured")),
    responses(
        (status = 200, description = "Recorded runs", body = [AdminRunItem]),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody),
        (status = 503, description = "Leaderboard unavailable", body = ErrorBody)
    )
)]
pub async fn list_runs(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AdminRunItem>>, AppError> {
    Ok(Json(admin_service::list_runs(&state).await?))
}

/// Apply a batch of edits: rows with an id update that run, rows without one insert a run.
///
/// The whole batch is rejected when any row is invalid.
#[utoipa::path(
    post,
    path = "/admin/runs",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Operator token, required when one is configured")),
    request_body = [AdminRunRow],
    responses(
        (status = 200, description = "Batch applied", body = AdminEditResponse),
        (status = 400, description = "Invalid row", body = ErrorBody),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody)
    )
)]
pub async fn edit_runs(
    State(state): State<SharedState>,
    extract::Json(rows): extract::Json<Vec<AdminRunRow>>,
) -> Result<Json<AdminEditResponse>, AppError> {
    Ok(Json(admin_service::edit_runs(&state, rows).await?))
}

/// Delete runs by id; the response counts only runs that existed.
#[utoipa::path(
    post,
    path = "/admin/runs/delete",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Operator token, required when one is configured")),
    request_body = [u64],
    responses(
        (status = 200, description = "Runs deleted", body = AdminDeleteResponse),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody)
    )
)]
pub async fn delete_runs(
    State(state): State<SharedState>,
    extract::Json(ids): extract::Json<Vec<RunId>>,
) -> Result<Json<AdminDeleteResponse>, AppError> {
    Ok(Json(admin_service::delete_runs(&state, ids).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/runs",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Operator token, required when one is configured")),
    responses(
        (status = 200, description = "Leaderboard wiped", body = AdminDeleteResponse),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody)
    )
)]
pub async fn clear_runs(
    State(state): State<SharedState>,
) -> Result<Json<AdminDeleteResponse>, AppError> {
    Ok(Json(admin_service::clear_runs(&state).await?))
}

/// Abandon any session, reset the stations and release every claimed name.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    params(("X-Admin-Token" = Option<String>, Header, description = "Operator token, required when one is configured")),
    responses(
        (status = 204, description = "Game floor reset"),
        (status = 401, description = "Missing or invalid admin token", body = ErrorBody)
    )
)]
pub async fn reset_floor(State(state): State<SharedState>) -> StatusCode {
    admin_service::reset_floor(&state).await;
    StatusCode::NO_CONTENT
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config().admin_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if provided == expected {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin token".into()))
    }
}
