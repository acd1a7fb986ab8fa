/// Database model definitions.
pub mod models;
/// Leaderboard persistence backends.
pub mod run_store;
/// Storage abstraction layer for database operations.
pub mod storage;
