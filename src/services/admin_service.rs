//! Business logic powering the admin REST routes: leaderboard maintenance and floor reset.

use tracing::info;

use crate::{
    dao::models::RunId,
    dto::admin::{AdminDeleteResponse, AdminEditResponse, AdminRunItem, AdminRunRow},
    error::ServiceError,
    services::leaderboard_service,
    state::SharedState,
};

/// Every recorded run, ordered by id.
pub async fn list_runs(state: &SharedState) -> Result<Vec<AdminRunItem>, ServiceError> {
    let runs = leaderboard_service::list_runs(state).await?;
    Ok(runs.into_iter().map(Into::into).collect())
}

/// Update existing runs and insert (possibly backfilled) new ones.
pub async fn edit_runs(
    state: &SharedState,
    rows: Vec<AdminRunRow>,
) -> Result<AdminEditResponse, ServiceError> {
    leaderboard_service::bulk_upsert_edit(state, rows).await
}

/// Delete runs by id.
pub async fn delete_runs(
    state: &SharedState,
    ids: Vec<RunId>,
) -> Result<AdminDeleteResponse, ServiceError> {
    let deleted = leaderboard_service::bulk_delete(state, ids).await?;
    Ok(AdminDeleteResponse { deleted })
}

/// Wipe the leaderboard.
pub async fn clear_runs(state: &SharedState) -> Result<AdminDeleteResponse, ServiceError> {
    let deleted = leaderboard_service::clear(state).await?;
    Ok(AdminDeleteResponse { deleted })
}

/// Bring the game floor back to its baseline: no session, pending stations, no claims, active.
pub async fn reset_floor(state: &SharedState) {
    let abandoned = state.session().abandon().await;
    let generation = state.stations().reset_all();
    state.names().clear();
    state.buzzer().take();
    state.idle().record_activity();

    info!(
        abandoned = abandoned.is_some(),
        generation, "game floor reset by admin"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::run_store::MemoryRunStore,
        dto::session::StartSessionRequest,
        services::session_service,
        state::{AppState, stations::StationStatus},
    };

    #[tokio::test]
    async fn reset_floor_restores_the_baseline() {
        let state = AppState::new(AppConfig::default());
        state.set_run_store(Arc::new(MemoryRunStore::new())).await;
        state.names().try_claim("Ann").unwrap();
        state.names().try_claim("Bo").unwrap();
        session_service::start(&state, StartSessionRequest { name: "Ann".into() })
            .await
            .unwrap();
        state
            .stations()
            .report_status("local", StationStatus::Correct);
        state.buzzer().press();

        reset_floor(&state).await;

        assert!(state.session().current().await.is_none());
        assert!(state.names().is_empty());
        assert!(!state.buzzer().take());
        assert!(
            state
                .stations()
                .snapshot()
                .stations
                .values()
                .all(|status| *status == StationStatus::Pending)
        );
    }

    #[tokio::test]
    async fn delete_reports_actual_count() {
        let state = AppState::new(AppConfig::default());
        state.set_run_store(Arc::new(MemoryRunStore::new())).await;
        let response = delete_runs(&state, vec![1, 2, 3]).await.unwrap();
        assert_eq!(response.deleted, 0);
    }
}
