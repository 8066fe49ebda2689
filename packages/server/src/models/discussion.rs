use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::validate_text;
use crate::entity::{additional_discussion_file, discussion};
use crate::error::AppError;
use crate::utils::ingest::parse_http_url;

/// Longest accepted prompt, in characters.
const MAX_PROMPT_CHARS: usize = 8000;

/// Where an attached file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentOrigin {
    /// A file of one of the course's materials; `id` is its material file ID.
    Material,
    /// A PDF the student uploaded to storage themselves.
    Upload,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DiscussionAttachment {
    pub from: AttachmentOrigin,
    /// Material file ID. Required when `from` is `material`.
    pub id: Option<i32>,
    #[schema(example = "pertemuan-3.pdf")]
    pub name: String,
    /// Public URL of the PDF.
    #[schema(example = "https://storage.example.com/uploads/pertemuan-3.pdf")]
    pub path: String,
}

/// Request body for a new discussion turn.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateDiscussionRequest {
    #[schema(example = "Jelaskan perbedaan stack dan queue")]
    pub prompt: String,
    /// Files the answer should be based on.
    #[serde(default)]
    pub file: Vec<DiscussionAttachment>,
}

pub fn validate_create_discussion(payload: &CreateDiscussionRequest) -> Result<(), AppError> {
    validate_prompt(&payload.prompt)?;
    for (index, attachment) in payload.file.iter().enumerate() {
        validate_text(&attachment.name, "file name", 256)?;
        parse_http_url(&attachment.path)?;
        if attachment.from == AttachmentOrigin::Material && attachment.id.is_none() {
            return Err(AppError::Validation(format!(
                "file[{index}].id is required for material files"
            )));
        }
    }
    Ok(())
}

/// Request body for regenerating (no prompt) or editing (new prompt) a turn.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct RegenerateDiscussionRequest {
    pub prompt: Option<String>,
}

pub fn validate_prompt(prompt: &str) -> Result<(), AppError> {
    validate_text(prompt, "prompt", MAX_PROMPT_CHARS)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DiscussionFileResponse {
    pub id: i32,
    pub material_file_id: i32,
    pub file_name: String,
    pub file_url: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdditionalDiscussionFileResponse {
    pub id: i32,
    pub file_name: String,
    #[schema(example = "pdf")]
    pub file_type: String,
    pub file_path: String,
}

impl From<additional_discussion_file::Model> for AdditionalDiscussionFileResponse {
    fn from(f: additional_discussion_file::Model) -> Self {
        Self {
            id: f.id,
            file_name: f.file_name,
            file_type: f.file_type,
            file_path: f.file_path,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DiscussionResponse {
    pub id: i32,
    pub course_id: i32,
    pub student_id: Uuid,
    pub prompt: String,
    /// Answer in Markdown.
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub files: Vec<DiscussionFileResponse>,
    pub additional_files: Vec<AdditionalDiscussionFileResponse>,
}

impl DiscussionResponse {
    pub fn new(
        d: discussion::Model,
        files: Vec<DiscussionFileResponse>,
        additional_files: Vec<additional_discussion_file::Model>,
    ) -> Self {
        Self {
            id: d.id,
            course_id: d.course_id,
            student_id: d.student_id,
            prompt: d.prompt,
            answer: d.answer,
            created_at: d.created_at,
            updated_at: d.updated_at,
            files,
            additional_files: additional_files.into_iter().map(Into::into).collect(),
        }
    }
}
