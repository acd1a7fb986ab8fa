use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_name_field;

/// Request to reserve a nickname for the next run.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClaimNameRequest {
    #[validate(custom(function = "validate_name_field"))]
    pub name: String,
}

/// Positive acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Whether a nickname is currently held. A hint only; claiming is what reserves it.
#[derive(Debug, Serialize, ToSchema)]
pub struct NameStatusResponse {
    pub name: String,
    pub claimed: bool,
}
