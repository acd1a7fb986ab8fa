use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::names::{ClaimNameRequest, NameStatusResponse, OkResponse},
    error::ServiceError,
    state::SharedState,
};

/// Reserve a nickname. Validation runs first; the registry insert is the only uniqueness gate.
pub async fn claim(
    state: &SharedState,
    request: ClaimNameRequest,
) -> Result<OkResponse, ServiceError> {
    request.validate()?;
    state.names().try_claim(&request.name)?;
    state.idle().record_activity();
    info!(name = %request.name, "name claimed");
    Ok(OkResponse::ok())
}

/// Report whether `name` is currently held.
pub fn status(state: &SharedState, name: String) -> NameStatusResponse {
    let claimed = state.names().is_claimed(&name);
    NameStatusResponse { name, claimed }
}

/// Release a claim. Unknown names are ignored.
pub fn release(state: &SharedState, name: &str) {
    if state.names().release(name) {
        info!(name = %name, "name released");
    } else {
        debug!(name = %name, "release of unclaimed name ignored");
    }
}
