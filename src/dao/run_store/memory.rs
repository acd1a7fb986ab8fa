//! In-process run store used when no database is configured, and by tests.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::SystemTime,
};

use futures::future::{self, BoxFuture};
use uuid::Uuid;

use super::RunStore;
use crate::dao::{
    models::{NewRunEntity, RunEntity, RunId},
    storage::StorageResult,
};

#[derive(Default)]
struct MemoryState {
    runs: BTreeMap<RunId, RunEntity>,
    by_session: HashMap<Uuid, RunId>,
    last_id: RunId,
    last_recorded_at: Option<SystemTime>,
}

impl MemoryState {
    /// Wall clock that never goes backwards, even if the system clock does.
    fn stamp(&mut self) -> SystemTime {
        let now = SystemTime::now();
        let stamp = match self.last_recorded_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_recorded_at = Some(stamp);
        stamp
    }
}

/// Mutex-guarded ordered map of runs keyed by id.
#[derive(Clone, Default)]
pub struct MemoryRunStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRunStore {
    /// Create an empty store; the first run gets id 1.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, run: NewRunEntity) -> RunEntity {
        let mut state = self.lock();
        if let Some(existing) = run
            .session
            .and_then(|session| state.by_session.get(&session))
            .and_then(|id| state.runs.get(id))
        {
            return existing.clone();
        }

        state.last_id += 1;
        let recorded_at = match run.recorded_at {
            Some(backfilled) => backfilled,
            None => state.stamp(),
        };
        let entity = RunEntity {
            id: state.last_id,
            name: run.name,
            elapsed: run.elapsed,
            recorded_at,
        };
        if let Some(session) = run.session {
            state.by_session.insert(session, entity.id);
        }
        state.runs.insert(entity.id, entity.clone());
        entity
    }

    fn ranked(&self, since: Option<SystemTime>) -> Vec<RunEntity> {
        let state = self.lock();
        let mut runs: Vec<RunEntity> = state
            .runs
            .values()
            .filter(|run| since.is_none_or(|since| run.recorded_at >= since))
            .cloned()
            .collect();
        // Fixed-width elapsed strings sort like durations.
        runs.sort_by(|a, b| a.elapsed.cmp(&b.elapsed).then(a.id.cmp(&b.id)));
        runs
    }

    fn update(&self, id: RunId, name: String, elapsed: String) -> bool {
        let mut state = self.lock();
        match state.runs.get_mut(&id) {
            Some(run) => {
                run.name = name;
                run.elapsed = elapsed;
                true
            }
            None => false,
        }
    }

    fn delete(&self, ids: Vec<RunId>) -> u64 {
        let mut state = self.lock();
        ids.into_iter()
            .filter(|id| state.runs.remove(id).is_some())
            .count() as u64
    }

    fn clear(&self) -> u64 {
        let mut state = self.lock();
        let count = state.runs.len() as u64;
        state.runs.clear();
        state.by_session.clear();
        count
    }
}

impl RunStore for MemoryRunStore {
    fn insert_run(&self, run: NewRunEntity) -> BoxFuture<'static, StorageResult<RunEntity>> {
        Box::pin(future::ready(Ok(self.insert(run))))
    }

    fn ranked_runs(
        &self,
        since: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>> {
        Box::pin(future::ready(Ok(self.ranked(since))))
    }

    fn list_runs(&self) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>> {
        let runs = self.lock().runs.values().cloned().collect();
        Box::pin(future::ready(Ok(runs)))
    }

    fn update_run(
        &self,
        id: RunId,
        name: String,
        elapsed: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        Box::pin(future::ready(Ok(self.update(id, name, elapsed))))
    }

    fn delete_runs(&self, ids: Vec<RunId>) -> BoxFuture<'static, StorageResult<u64>> {
        Box::pin(future::ready(Ok(self.delete(ids))))
    }

    fn clear_runs(&self) -> BoxFuture<'static, StorageResult<u64>> {
        Box::pin(future::ready(Ok(self.clear())))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn run(name: &str, elapsed: &str) -> NewRunEntity {
        NewRunEntity::new(name.into(), elapsed.into())
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = MemoryRunStore::new();
        let first = store.insert_run(run("Ann", "00:01:23.456")).await.unwrap();
        let second = store.insert_run(run("Bo", "00:01:22.000")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.recorded_at >= first.recorded_at);
    }

    #[tokio::test]
    async fn one_run_per_session() {
        let store = MemoryRunStore::new();
        let session = Uuid::new_v4();
        let first = store
            .insert_run(run("Ann", "00:01:23.456").for_session(session))
            .await
            .unwrap();
        let again = store
            .insert_run(run("Ann", "00:01:23.456").for_session(session))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(store.list_runs().await.unwrap().len(), 1);

        store.clear_runs().await.unwrap();
        let after_clear = store
            .insert_run(run("Ann", "00:01:23.456").for_session(session))
            .await
            .unwrap();
        assert_ne!(after_clear.id, first.id);
    }

    #[tokio::test]
    async fn ranking_orders_by_time_then_id() {
        let store = MemoryRunStore::new();
        store.insert_run(run("Ann", "00:01:23.456")).await.unwrap();
        store.insert_run(run("Bo", "00:01:22.000")).await.unwrap();
        store.insert_run(run("Cy", "00:01:22.000")).await.unwrap();

        let names: Vec<_> = store
            .ranked_runs(None)
            .await
            .unwrap()
            .into_iter()
            .map(|run| run.name)
            .collect();
        assert_eq!(names, ["Bo", "Cy", "Ann"]);
    }

    #[tokio::test]
    async fn ranking_since_filters_backfilled_rows() {
        let store = MemoryRunStore::new();
        let old = NewRunEntity {
            recorded_at: Some(SystemTime::now() - Duration::from_secs(2 * 3600)),
            ..run("Old", "00:00:10.000")
        };
        store.insert_run(old).await.unwrap();
        store.insert_run(run("New", "00:02:00.000")).await.unwrap();

        let since = SystemTime::now() - Duration::from_secs(3600);
        let recent = store.ranked_runs(Some(since)).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "New");
        assert_eq!(store.ranked_runs(None).await.unwrap()[0].name, "Old");
    }

    #[tokio::test]
    async fn delete_counts_only_existing_rows() {
        let store = MemoryRunStore::new();
        for i in 0..7 {
            store
                .insert_run(run(&format!("p{i}"), "00:00:01.000"))
                .await
                .unwrap();
        }
        assert_eq!(store.delete_runs(vec![7, 999]).await.unwrap(), 1);
        assert!(store.list_runs().await.unwrap().iter().all(|r| r.id != 7));
        assert_eq!(store.delete_runs(vec![7]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_and_clear() {
        let store = MemoryRunStore::new();
        let entity = store.insert_run(run("Ann", "00:01:23.456")).await.unwrap();
        assert!(
            store
                .update_run(entity.id, "Anna".into(), "00:01:20.000".into())
                .await
                .unwrap()
        );
        assert!(
            !store
                .update_run(42, "Ghost".into(), "00:00:00.000".into())
                .await
                .unwrap()
        );
        let listed = store.list_runs().await.unwrap();
        assert_eq!(listed[0].name, "Anna");
        assert_eq!(listed[0].recorded_at, entity.recorded_at);

        assert_eq!(store.clear_runs().await.unwrap(), 1);
        assert!(store.list_runs().await.unwrap().is_empty());
    }
}
