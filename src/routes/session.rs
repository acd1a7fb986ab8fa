use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::session::{
        BuzzerResponse, FinishSessionRequest, FinishSessionResponse, IdleResponse, SessionView,
        StartSessionRequest,
    },
    error::{AppError, ErrorBody},
    routes::extract,
    services::{idle_service, session_service},
    state::SharedState,
};

/// Session lifecycle, buzzer and kiosk activity endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/session",
            get(current_session)
                .post(start_session)
                .delete(abandon_session),
        )
        .route("/session/finish", post(finish_session))
        .route("/buzzer", get(poll_buzzer).post(press_buzzer))
        .route("/activity", post(record_activity))
        .route("/idle", get(idle_status))
}

/// Start the timed session for a claimed name and reset the station board.
#[utoipa::path(
    post,
    path = "/session",
    tag = "session",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Session started", body = SessionView),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 409, description = "A session is already running or the name is not claimed", body = ErrorBody)
    )
)]
pub async fn start_session(
    State(state): State<SharedState>,
    extract::Json(payload): extract::Json<StartSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::start(&state, payload).await?))
}

#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Running session", body = SessionView),
        (status = 404, description = "No session running", body = ErrorBody)
    )
)]
pub async fn current_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::view(&state).await?))
}

/// Finalize the running session: freeze the clock once and record the run.
#[utoipa::path(
    post,
    path = "/session/finish",
    tag = "session",
    request_body = FinishSessionRequest,
    responses(
        (status = 200, description = "Run recorded", body = FinishSessionResponse),
        (status = 404, description = "No session running", body = ErrorBody),
        (status = 409, description = "Already finalized or stations not all correct", body = ErrorBody),
        (status = 503, description = "Leaderboard unavailable; the session stays open", body = ErrorBody)
    )
)]
pub async fn finish_session(
    State(state): State<SharedState>,
    extract::Json(payload): extract::Json<FinishSessionRequest>,
) -> Result<Json<FinishSessionResponse>, AppError> {
    Ok(Json(session_service::finish(&state, payload).await?))
}

/// Drop the running session without recording anything.
#[utoipa::path(
    delete,
    path = "/session",
    tag = "session",
    responses((status = 204, description = "Session abandoned"))
)]
pub async fn abandon_session(State(state): State<SharedState>) -> StatusCode {
    session_service::abandon(&state).await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/buzzer",
    tag = "session",
    responses((status = 204, description = "Buzzer press latched"))
)]
pub async fn press_buzzer(State(state): State<SharedState>) -> StatusCode {
    session_service::press_buzzer(&state);
    StatusCode::NO_CONTENT
}

/// Consume the latched buzzer press, if any.
#[utoipa::path(
    get,
    path = "/buzzer",
    tag = "session",
    responses((status = 200, description = "Whether the buzzer was pressed since the last poll", body = BuzzerResponse))
)]
pub async fn poll_buzzer(State(state): State<SharedState>) -> Json<BuzzerResponse> {
    Json(session_service::poll_buzzer(&state))
}

#[utoipa::path(
    post,
    path = "/activity",
    tag = "session",
    responses((status = 200, description = "Activity recorded; idle mode left", body = IdleResponse))
)]
pub async fn record_activity(State(state): State<SharedState>) -> Json<IdleResponse> {
    Json(idle_service::record_activity(&state))
}

#[utoipa::path(
    get,
    path = "/idle",
    tag = "session",
    responses((status = 200, description = "Idle mode flag", body = IdleResponse))
)]
pub async fn idle_status(State(state): State<SharedState>) -> Json<IdleResponse> {
    Json(idle_service::status(&state))
}
