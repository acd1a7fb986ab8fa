//! Session lifecycle: stopwatch start, one-shot finalization into a recorded run, abandonment,
//! and the finish buzzer.

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    dao::models::NewRunEntity,
    dto::session::{
        BuzzerResponse, FinishReason, FinishSessionRequest, FinishSessionResponse,
        SessionView, StartSessionRequest,
    },
    error::ServiceError,
    state::{SharedState, session::FinalizeError},
};

/// Upper bound for persisting the finished run before the gate is reopened.
pub const FINALIZE_TIMEOUT: Duration = Duration::from_secs(5);

/// Start the stopwatch for a claimed nickname. Stations are reset as part of the start.
pub async fn start(
    state: &SharedState,
    request: StartSessionRequest,
) -> Result<SessionView, ServiceError> {
    request.validate()?;
    if !state.names().is_claimed(&request.name) {
        return Err(ServiceError::InvalidState(format!(
            "name `{}` has not been claimed",
            request.name
        )));
    }

    let stations = state.stations();
    let session = state
        .session()
        .start(request.name, || stations.reset_all())
        .await?;
    state.buzzer().take();
    state.idle().record_activity();

    info!(
        session = %session.id(),
        name = %session.name(),
        generation = session.board_generation(),
        "session started"
    );
    Ok(SessionView::new(&session, stations.is_victory()))
}

/// The running session.
pub async fn view(state: &SharedState) -> Result<SessionView, ServiceError> {
    let session = state
        .session()
        .current()
        .await
        .ok_or(FinalizeError::NoSession)?;
    Ok(SessionView::new(&session, state.stations().is_victory()))
}

/// Finalize the running session into a leaderboard run.
///
/// Only the first caller gets through the gate; it pauses the clock and records the run.
/// Concurrent callers get a conflict. If persisting fails the gate is reopened with the clock
/// still paused, so a retry records the same time.
pub async fn finish(
    state: &SharedState,
    request: FinishSessionRequest,
) -> Result<FinishSessionResponse, ServiceError> {
    state
        .session()
        .current()
        .await
        .ok_or(FinalizeError::NoSession)?;
    if request.reason == FinishReason::Victory && !state.stations().is_victory() {
        return Err(FinalizeError::NotVictorious.into());
    }
    let store = state.require_run_store().await?;

    let ticket = state.session().plan_finalize().await?;
    let run = NewRunEntity::new(
        ticket.session().name().to_owned(),
        ticket.elapsed().to_string(),
    )
    .for_session(ticket.session().id());

    let entity = match timeout(FINALIZE_TIMEOUT, store.insert_run(run)).await {
        Ok(Ok(entity)) => entity,
        Ok(Err(err)) => {
            warn!(
                session = %ticket.session().id(),
                error = %err,
                "failed to record run; finalization can be retried"
            );
            state.session().abort_finalize(ticket);
            return Err(err.into());
        }
        Err(_) => {
            warn!(
                session = %ticket.session().id(),
                "recording the run timed out; finalization can be retried"
            );
            state.session().abort_finalize(ticket);
            return Err(ServiceError::Timeout);
        }
    };

    let (session, still_current) = state.session().apply_finalize(ticket).await;
    if still_current {
        if request.reason == FinishReason::Manual {
            state.buzzer().take();
        }
        // The run record supersedes the claim.
        state.names().release(session.name());
        schedule_station_reset(state, session.board_generation());
    } else {
        // The name and board may already belong to a newer session.
        warn!(
            session = %session.id(),
            run = entity.id,
            "session was abandoned while its run was being recorded"
        );
    }

    info!(
        session = %session.id(),
        run = entity.id,
        name = %entity.name,
        time = %entity.elapsed,
        reason = ?request.reason,
        "session finalized"
    );
    Ok(FinishSessionResponse {
        id: entity.id,
        name: entity.name,
        time: entity.elapsed,
    })
}

/// Reset the board after the victory screen delay, unless it was reset since `generation`.
fn schedule_station_reset(state: &SharedState, generation: u64) {
    let delay = state.config().victory_reset_delay;
    let state = state.clone();
    tokio::spawn(async move {
        sleep(delay).await;
        if state.stations().reset_if_generation(generation) {
            debug!(generation, "station board reset after finalization");
        } else {
            debug!(generation, "delayed station reset skipped; board already reset");
        }
    });
}

/// Drop the running session and release its name. Safe to call when nothing runs.
pub async fn abandon(state: &SharedState) {
    let abandoned = state.session().abandon().await;
    state.stations().reset_all();
    state.buzzer().take();

    match abandoned {
        Some(session) => {
            state.names().release(session.name());
            info!(session = %session.id(), name = %session.name(), "session abandoned");
        }
        None => debug!("abandon without a running session"),
    }
}

/// Record a buzzer press.
pub fn press_buzzer(state: &SharedState) {
    state.buzzer().press();
    state.idle().record_activity();
    debug!("buzzer pressed");
}

/// Read and clear the buzzer latch.
pub fn poll_buzzer(state: &SharedState) -> BuzzerResponse {
    BuzzerResponse {
        clicked: state.buzzer().take(),
    }
}
