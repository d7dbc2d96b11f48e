//! Input validation utilities.

use validator::Validate;

use crate::error::KeeperError;

/// Validate a request body, returning `KeeperError::InvalidArgument` on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), KeeperError> {
    body.validate().map_err(|e| KeeperError::InvalidArgument {
        field: format_validation_errors(e),
    })
}

fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
