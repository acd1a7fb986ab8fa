use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::models::RunId;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to allocate the next run id")]
    NextId {
        #[source]
        source: MongoError,
    },
    #[error("run id counter returned no document")]
    CounterMissing,
    #[error("stored run has negative id `{id}`")]
    NegativeId { id: i64 },
    #[error("failed to insert run `{id}`")]
    InsertRun {
        id: RunId,
        #[source]
        source: MongoError,
    },
    #[error("failed to query runs")]
    QueryRuns {
        #[source]
        source: MongoError,
    },
    #[error("failed to update run `{id}`")]
    UpdateRun {
        id: RunId,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete runs")]
    DeleteRuns {
        #[source]
        source: MongoError,
    },
}
