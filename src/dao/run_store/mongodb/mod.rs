mod config;
mod error;
mod models;
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoRunStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::CounterMissing | MongoDaoError::NegativeId { .. } => {
                StorageError::Corrupt(err.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
