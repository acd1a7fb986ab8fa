use crate::{dto::session::IdleResponse, state::SharedState};

/// Register an activity signal from the kiosk frontend.
pub fn record_activity(state: &SharedState) -> IdleResponse {
    state.idle().record_activity();
    IdleResponse { idle: false }
}

/// Whether idle mode is on.
pub fn status(state: &SharedState) -> IdleResponse {
    IdleResponse {
        idle: state.idle().is_idle(),
    }
}
