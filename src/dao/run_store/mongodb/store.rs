use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{CounterDocument, MongoRunDocument, id_from_bson, id_to_bson},
};
use crate::dao::{
    models::{NewRunEntity, RunEntity, RunId},
    run_store::RunStore,
    storage::StorageResult,
};

const RUN_COLLECTION_NAME: &str = "runs";
const COUNTER_COLLECTION_NAME: &str = "counters";
const RUN_COUNTER_ID: &str = "runs";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed [`RunStore`].
#[derive(Clone)]
pub struct MongoRunStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database = self.config.open_database().await?;
        *self.database.write().await = database;
        Ok(())
    }
}

impl MongoRunStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = config.open_database().await?;

        let inner = Arc::new(MongoInner {
            database: RwLock::new(database),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.runs().await;

        let ranking = IndexModel::builder()
            .keys(doc! {"elapsed": 1, "_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("run_ranking_idx".to_owned()))
                    .build(),
            )
            .build();
        collection
            .create_index(ranking)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RUN_COLLECTION_NAME,
                index: "elapsed,_id",
                source,
            })?;

        let recorded = IndexModel::builder()
            .keys(doc! {"recorded_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("run_recorded_at_idx".to_owned()))
                    .build(),
            )
            .build();
        collection
            .create_index(recorded)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RUN_COLLECTION_NAME,
                index: "recorded_at",
                source,
            })?;

        let session = IndexModel::builder()
            .keys(doc! {"session": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("run_session_idx".to_owned()))
                    .unique(Some(true))
                    .sparse(Some(true))
                    .build(),
            )
            .build();
        collection
            .create_index(session)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RUN_COLLECTION_NAME,
                index: "session",
                source,
            })?;

        Ok(())
    }

    async fn runs(&self) -> Collection<MongoRunDocument> {
        self.inner
            .database
            .read()
            .await
            .collection::<MongoRunDocument>(RUN_COLLECTION_NAME)
    }

    async fn counters(&self) -> Collection<CounterDocument> {
        self.inner
            .database
            .read()
            .await
            .collection::<CounterDocument>(COUNTER_COLLECTION_NAME)
    }

    async fn next_id(&self) -> MongoResult<RunId> {
        let counter = self
            .counters()
            .await
            .find_one_and_update(doc! {"_id": RUN_COUNTER_ID}, doc! {"$inc": {"seq": 1_i64}})
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::NextId { source })?
            .ok_or(MongoDaoError::CounterMissing)?;
        id_from_bson(counter.seq)
    }

    /// Insert a run, or return the one already recorded for the same session.
    async fn insert_run(&self, run: NewRunEntity) -> MongoResult<RunEntity> {
        let session = run.session.map(|session| session.to_string());
        if let Some(key) = session.as_deref() {
            if let Some(existing) = self.find_by_session(key).await? {
                return Ok(existing);
            }
        }

        let id = self.next_id().await?;
        let entity = RunEntity {
            id,
            name: run.name,
            elapsed: run.elapsed,
            recorded_at: run.recorded_at.unwrap_or_else(SystemTime::now),
        };
        let document = MongoRunDocument {
            session: session.clone(),
            ..entity.clone().into()
        };
        match self.runs().await.insert_one(&document).await {
            Ok(_) => Ok(entity),
            // A concurrent retry of the same session won the unique index.
            Err(source) if is_duplicate_key(&source) => match session.as_deref() {
                Some(key) => self
                    .find_by_session(key)
                    .await?
                    .ok_or(MongoDaoError::InsertRun { id, source }),
                None => Err(MongoDaoError::InsertRun { id, source }),
            },
            Err(source) => Err(MongoDaoError::InsertRun { id, source }),
        }
    }

    async fn find_by_session(&self, session: &str) -> MongoResult<Option<RunEntity>> {
        self.runs()
            .await
            .find_one(doc! {"session": session})
            .await
            .map_err(|source| MongoDaoError::QueryRuns { source })?
            .map(RunEntity::try_from)
            .transpose()
    }

    async fn find_runs(&self, filter: Document, sort: Document) -> MongoResult<Vec<RunEntity>> {
        let documents: Vec<MongoRunDocument> = self
            .runs()
            .await
            .find(filter)
            .sort(sort)
            .await
            .map_err(|source| MongoDaoError::QueryRuns { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryRuns { source })?;

        documents.into_iter().map(RunEntity::try_from).collect()
    }

    async fn ranked_runs(&self, since: Option<SystemTime>) -> MongoResult<Vec<RunEntity>> {
        let filter = match since {
            Some(since) => doc! {"recorded_at": {"$gte": DateTime::from_system_time(since)}},
            None => doc! {},
        };
        self.find_runs(filter, doc! {"elapsed": 1, "_id": 1}).await
    }

    async fn update_run(&self, id: RunId, name: String, elapsed: String) -> MongoResult<bool> {
        let result = self
            .runs()
            .await
            .update_one(
                doc! {"_id": id_to_bson(id)},
                doc! {"$set": {"name": name, "elapsed": elapsed}},
            )
            .await
            .map_err(|source| MongoDaoError::UpdateRun { id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_matching(&self, filter: Document) -> MongoResult<u64> {
        let result = self
            .runs()
            .await
            .delete_many(filter)
            .await
            .map_err(|source| MongoDaoError::DeleteRuns { source })?;
        Ok(result.deleted_count)
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

impl RunStore for MongoRunStore {
    fn insert_run(&self, run: NewRunEntity) -> BoxFuture<'static, StorageResult<RunEntity>> {
        let store = self.clone();
        Box::pin(async move { store.insert_run(run).await.map_err(Into::into) })
    }

    fn ranked_runs(
        &self,
        since: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.ranked_runs(since).await.map_err(Into::into) })
    }

    fn list_runs(&self) -> BoxFuture<'static, StorageResult<Vec<RunEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_runs(doc! {}, doc! {"_id": 1})
                .await
                .map_err(Into::into)
        })
    }

    fn update_run(
        &self,
        id: RunId,
        name: String,
        elapsed: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_run(id, name, elapsed)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_runs(&self, ids: Vec<RunId>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let ids: Vec<i64> = ids.into_iter().map(id_to_bson).collect();
            store
                .delete_matching(doc! {"_id": {"$in": ids}})
                .await
                .map_err(Into::into)
        })
    }

    fn clear_runs(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.delete_matching(doc! {}).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
