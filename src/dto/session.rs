use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::RunId,
    dto::{format_system_time, validation::validate_name_field},
    state::session::ActiveSession,
};

/// Start the stopwatch for a claimed nickname.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartSessionRequest {
    #[validate(custom(function = "validate_name_field"))]
    pub name: String,
}

/// Current state of the running session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub session_id: Uuid,
    pub name: String,
    /// RFC 3339 wall-clock start time.
    pub started_at: String,
    /// Elapsed time so far, `00:MM:SS.mmm`.
    pub elapsed: String,
    /// Whether the clock has been stopped by a finalization attempt.
    pub paused: bool,
    pub victory: bool,
    pub finalized: bool,
}

impl SessionView {
    pub fn new(session: &ActiveSession, victory: bool) -> Self {
        Self {
            session_id: session.id(),
            name: session.name().to_owned(),
            started_at: format_system_time(session.started_at()),
            elapsed: session.elapsed().to_string(),
            paused: session.clock().is_paused(),
            victory,
            finalized: session.is_finalized(),
        }
    }
}

/// What ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Every station reports correct.
    Victory,
    /// Finish button or buzzer.
    Manual,
}

/// Request to finalize the running session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishSessionRequest {
    pub reason: FinishReason,
}

/// Run recorded by a successful finalization.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinishSessionResponse {
    pub id: RunId,
    pub name: String,
    pub time: String,
}

/// Buzzer poll result. Each press is reported once.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuzzerResponse {
    pub clicked: bool,
}

/// Whether the kiosk is in idle (ambient) mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdleResponse {
    pub idle: bool,
}
