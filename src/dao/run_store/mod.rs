pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use crate::dao::models::{NewRunEntity, RunEntity, RunId};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

pub use memory::MemoryRunStore;

/// Abstraction over the durable leaderboard store.
pub trait RunStore: Send + Sync {
    /// Insert a run and return it with its generated id and timestamp.
    fn insert_run(&self, run: NewRunEntity) -> BoxFuture<'static, StorageResult<RunEntity>>;
    /// Runs recorded at or after `since` (all runs for `None`), fastest first, ties by id.
    fn ranked_runs(
        &self,
        since: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>>;
    /// Every run ordered by id.
    fn list_runs(&self) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>>;
    /// Replace name and elapsed time of `id`. Returns false when the id does not exist.
    fn update_run(
        &self,
        id: RunId,
        name: String,
        elapsed: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Delete the runs whose id is listed, returning how many existed.
    fn delete_runs(&self, ids: Vec<RunId>) -> BoxFuture<'static, StorageResult<u64>>;
    /// Delete every run, returning how many existed.
    fn clear_runs(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Cheap liveness probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection in place.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
