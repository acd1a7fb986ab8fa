//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{RunEntity, RunId},
    dto::{
        format_system_time,
        validation::{validate_elapsed_field, validate_name_field},
    },
};

/// Full projection of a recorded run for administrators.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminRunItem {
    pub id: RunId,
    pub name: String,
    pub time: String,
    /// RFC 3339 timestamp.
    pub recorded_at: String,
}

impl From<RunEntity> for AdminRunItem {
    fn from(value: RunEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            time: value.elapsed,
            recorded_at: format_system_time(value.recorded_at),
        }
    }
}

/// One row of an admin edit batch: rows with an `id` update that run, rows without insert one.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AdminRunRow {
    #[serde(default)]
    pub id: Option<RunId>,
    #[validate(custom(function = "validate_name_field"))]
    pub name: String,
    #[validate(custom(function = "validate_elapsed_field"))]
    pub time: String,
    /// RFC 3339 timestamp honoured only on inserts, to backfill history.
    #[serde(default)]
    pub recorded_at: Option<String>,
}

/// Summary of an admin edit batch.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct AdminEditResponse {
    /// Number of existing runs updated.
    pub updated: u64,
    /// Ids of the inserted runs, in row order.
    pub inserted: Vec<RunId>,
    /// Ids of rows that referenced no existing run.
    pub skipped: Vec<RunId>,
}

/// Number of runs removed.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDeleteResponse {
    pub deleted: u64,
}
