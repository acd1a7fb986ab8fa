use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{RunEntity, RunId},
    dto::validation::{validate_elapsed_field, validate_name_field},
};

/// Completed run submitted by the kiosk.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecordRunRequest {
    #[validate(custom(function = "validate_name_field"))]
    pub name: String,
    /// Elapsed time, `00:MM:SS.mmm`.
    #[validate(custom(function = "validate_elapsed_field"))]
    pub time: String,
}

/// Identifier of the recorded run.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordRunResponse {
    pub id: RunId,
}

/// Which part of the history to rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingScope {
    /// Runs recorded within the configured recent window (one hour by default).
    #[default]
    Recent,
    /// Every run.
    All,
}

/// Query string of the rankings route.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct RankingQuery {
    /// `recent` (default) or `all`.
    #[serde(default)]
    pub scope: RankingScope,
    /// Keep only the first `limit` entries.
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
}

/// Leaderboard line, fastest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingItem {
    pub name: String,
    pub time: String,
}

impl From<RunEntity> for RankingItem {
    fn from(value: RunEntity) -> Self {
        Self {
            name: value.name,
            time: value.elapsed,
        }
    }
}
