use axum::extract::DefaultBodyLimit;
use genai::{Content, GenAiError};

use crate::error::AppError;
use crate::state::AppState;

pub mod auth;
pub mod course;
pub mod discussion;
pub mod quiz;
pub mod simplify;

/// Most PDFs accepted by one multipart request.
pub const MAX_UPLOAD_FILES: usize = 10;

/// Body limit for multipart routes: room for every file plus form overhead.
pub fn upload_body_limit(max_file_size: u64) -> DefaultBodyLimit {
    let per_file = usize::try_from(max_file_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(
        per_file
            .saturating_mul(MAX_UPLOAD_FILES)
            .saturating_add(64 * 1024),
    )
}

/// Run one generation and require a non-blank answer.
pub(crate) async fn generate_text(
    state: &AppState,
    contents: &[Content],
) -> Result<String, AppError> {
    let text = state.genai.generate(contents).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(GenAiError::EmptyResponse.into());
    }
    Ok(text.to_string())
}
