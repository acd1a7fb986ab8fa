use std::error::Error;
use thiserror::Error;

/// Result alias for run store operations.
pub type StorageResult<T> = Result<T, StorageError>;

type BoxedSource = Box<dyn Error + Send + Sync>;

/// Failure of a run store, independent of the backend behind it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Backend error.
        #[source]
        source: BoxedSource,
    },
    /// The backend answered with data that does not describe a valid run.
    #[error("corrupt run record: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Wrap a backend failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
