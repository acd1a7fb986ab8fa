//! Validation helpers for DTOs.
//!
//! Both validators delegate to the domain rules so request validation and the core checks agree.

use validator::ValidationError;

use crate::{elapsed, state::names::validate_name};

/// Validates a participant nickname: non-empty after trimming and at most 13 characters.
pub fn validate_name_field(name: &str) -> Result<(), ValidationError> {
    validate_name(name).map_err(|err| {
        let mut error = ValidationError::new("name");
        error.message = Some(err.to_string().into());
        error
    })
}

/// Validates an elapsed time in `00:MM:SS.mmm` form with in-range fields.
///
/// # Examples
///
/// ```ignore
/// validate_elapsed_field("00:01:23.456") // Ok
/// validate_elapsed_field("00:99:99.999") // Err - out of range
/// validate_elapsed_field("1:23.456")     // Err - layout
/// ```
pub fn validate_elapsed_field(time: &str) -> Result<(), ValidationError> {
    elapsed::parse(time).map(|_| ()).map_err(|err| {
        let mut error = ValidationError::new("time");
        error.message = Some(err.to_string().into());
        error
    })
}
