//! Ranking engine: recording runs, windowed and full rankings, and administrative edits.
//!
//! Stored elapsed times are always canonical `00:MM:SS.mmm` strings, so ordering is delegated to
//! the store as a plain string sort.

use std::time::{Duration, SystemTime};

use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::models::{NewRunEntity, RunEntity, RunId},
    dto::{
        admin::{AdminEditResponse, AdminRunRow},
        parse_system_time,
        runs::{RankingItem, RankingQuery, RankingScope, RecordRunRequest},
    },
    elapsed,
    error::ServiceError,
    state::SharedState,
};

/// Validate and persist a completed run. The timestamp always comes from the store.
pub async fn record_run(
    state: &SharedState,
    request: RecordRunRequest,
) -> Result<RunEntity, ServiceError> {
    request.validate()?;
    let time = elapsed::validate(&request.time)?;
    let store = state.require_run_store().await?;

    let entity = store
        .insert_run(NewRunEntity::new(request.name, time))
        .await?;
    info!(id = entity.id, name = %entity.name, time = %entity.elapsed, "run recorded");
    Ok(entity)
}

/// Runs recorded within `window` of now, fastest first.
pub async fn windowed_ranking(
    state: &SharedState,
    window: Duration,
) -> Result<Vec<RunEntity>, ServiceError> {
    let since = SystemTime::now()
        .checked_sub(window)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let store = state.require_run_store().await?;
    Ok(store.ranked_runs(Some(since)).await?)
}

/// Every run, fastest first.
pub async fn full_ranking(state: &SharedState) -> Result<Vec<RunEntity>, ServiceError> {
    let store = state.require_run_store().await?;
    Ok(store.ranked_runs(None).await?)
}

/// Prefix of at most `n` entries.
pub fn top_n<T>(mut sequence: Vec<T>, n: usize) -> Vec<T> {
    sequence.truncate(n);
    sequence
}

/// Rankings as served to the kiosk screens.
pub async fn rankings(
    state: &SharedState,
    query: RankingQuery,
) -> Result<Vec<RankingItem>, ServiceError> {
    query.validate()?;
    let runs = match query.scope {
        RankingScope::Recent => windowed_ranking(state, state.config().recent_window).await?,
        RankingScope::All => full_ranking(state).await?,
    };
    let runs = match query.limit {
        Some(limit) => top_n(runs, limit),
        None => runs,
    };
    Ok(runs.into_iter().map(Into::into).collect())
}

/// Every run ordered by id.
pub async fn list_runs(state: &SharedState) -> Result<Vec<RunEntity>, ServiceError> {
    let store = state.require_run_store().await?;
    Ok(store.list_runs().await?)
}

/// Delete the listed runs; unknown ids are ignored. Returns how many runs were removed.
pub async fn bulk_delete(state: &SharedState, ids: Vec<RunId>) -> Result<u64, ServiceError> {
    let store = state.require_run_store().await?;
    let requested = ids.len();
    let deleted = store.delete_runs(ids).await?;
    info!(requested, deleted, "runs deleted");
    Ok(deleted)
}

/// Delete every run.
pub async fn clear(state: &SharedState) -> Result<u64, ServiceError> {
    let store = state.require_run_store().await?;
    let deleted = store.clear_runs().await?;
    warn!(deleted, "leaderboard cleared");
    Ok(deleted)
}

enum EditOp {
    Update {
        id: RunId,
        name: String,
        elapsed: String,
    },
    Insert(NewRunEntity),
}

fn prepare_row(index: usize, row: AdminRunRow) -> Result<EditOp, ServiceError> {
    let invalid = |message: String| ServiceError::InvalidInput(format!("row {index}: {message}"));

    row.validate().map_err(|err| invalid(err.to_string()))?;
    let elapsed = elapsed::validate(&row.time).map_err(|err| invalid(err.to_string()))?;

    match row.id {
        Some(id) => Ok(EditOp::Update {
            id,
            name: row.name,
            elapsed,
        }),
        None => {
            let recorded_at = row
                .recorded_at
                .as_deref()
                .map(parse_system_time)
                .transpose()
                .map_err(|err| invalid(format!("invalid recorded_at: {err}")))?;
            // The recent window has no upper bound; a future stamp would never leave it.
            if recorded_at.is_some_and(|at| at > SystemTime::now()) {
                return Err(invalid("recorded_at must not be in the future".into()));
            }
            Ok(EditOp::Insert(NewRunEntity {
                recorded_at,
                ..NewRunEntity::new(row.name, elapsed)
            }))
        }
    }
}

/// Apply an admin edit batch.
///
/// Every row is validated before anything is written, so a bad row rejects the whole batch.
/// Rows are then applied in order; rows naming an unknown id are skipped and reported. A storage
/// failure part way through leaves the rows applied so far in place.
pub async fn bulk_upsert_edit(
    state: &SharedState,
    rows: Vec<AdminRunRow>,
) -> Result<AdminEditResponse, ServiceError> {
    let ops = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| prepare_row(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    let store = state.require_run_store().await?;
    let mut response = AdminEditResponse::default();

    for op in ops {
        match op {
            EditOp::Update { id, name, elapsed } => {
                if store.update_run(id, name, elapsed).await? {
                    response.updated += 1;
                } else {
                    response.skipped.push(id);
                }
            }
            EditOp::Insert(run) => {
                let entity = store.insert_run(run).await?;
                response.inserted.push(entity.id);
            }
        }
    }

    info!(
        updated = response.updated,
        inserted = response.inserted.len(),
        skipped = response.skipped.len(),
        "admin edit applied"
    );
    Ok(response)
}
