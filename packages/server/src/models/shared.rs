use serde::Serialize;

use crate::error::AppError;

/// Envelope returned by all endpoints on success.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    /// Human-readable summary of what happened.
    #[schema(example = "Success get data")]
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Validate a trimmed, required text field (1-`max` Unicode characters).
pub fn validate_text(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}
