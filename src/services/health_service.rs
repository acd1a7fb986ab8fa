use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the run store and report whether the leaderboard is usable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.run_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::new(state.is_degraded())
}
