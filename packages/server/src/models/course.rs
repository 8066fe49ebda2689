use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_text;
use crate::entity::{course, material, material_file};
use crate::error::AppError;
use crate::utils::ingest::parse_http_url;

/// Request body for creating a course.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    #[schema(example = "Struktur Data")]
    pub name: String,
    #[schema(example = "Informatika")]
    pub program: String,
    #[schema(example = "Dr. Budi Santoso")]
    pub instructor: String,
    /// Free-form schedule, e.g. which weeks the course runs.
    #[schema(example = "Minggu 1-16")]
    pub weeks: String,
    /// Start time of a session, `HH:MM`.
    #[schema(example = "08:00")]
    pub time_start: String,
    /// End time of a session, `HH:MM`.
    #[schema(example = "09:40")]
    pub time_end: String,
    #[schema(example = 40)]
    pub student_count: i32,
}

pub fn validate_create_course(payload: &CreateCourseRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "name", 256)?;
    validate_text(&payload.program, "program", 256)?;
    validate_text(&payload.instructor, "instructor", 256)?;
    validate_text(&payload.weeks, "weeks", 64)?;

    let start = parse_time(&payload.time_start, "time_start")?;
    let end = parse_time(&payload.time_end, "time_end")?;
    if end <= start {
        return Err(AppError::Validation(
            "time_end must be after time_start".into(),
        ));
    }
    if payload.student_count < 0 {
        return Err(AppError::Validation("student_count must be >= 0".into()));
    }
    Ok(())
}

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| AppError::Validation(format!("{field} must be formatted as HH:MM")))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub name: String,
    pub program: String,
    pub instructor: String,
    pub weeks: String,
    pub time_start: String,
    pub time_end: String,
    pub student_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(c: course::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            program: c.program,
            instructor: c.instructor,
            weeks: c.weeks,
            time_start: c.time_start,
            time_end: c.time_end,
            student_count: c.student_count,
            created_at: c.created_at,
        }
    }
}

/// A file to attach to a new material. The PDF itself lives in object storage.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct MaterialFileInput {
    #[schema(example = "pertemuan-1.pdf")]
    pub file_name: String,
    /// Path of the object inside its bucket.
    #[schema(example = "materials/12/pertemuan-1.pdf")]
    pub file_path: String,
    /// Public download URL.
    #[schema(example = "https://storage.example.com/materials/12/pertemuan-1.pdf")]
    pub file_url: String,
}

/// Request body for creating a material with its files.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMaterialRequest {
    #[schema(example = "Pertemuan 1: Array dan Linked List")]
    pub name: String,
    #[serde(default)]
    pub files: Vec<MaterialFileInput>,
}

pub fn validate_create_material(payload: &CreateMaterialRequest) -> Result<(), AppError> {
    validate_text(&payload.name, "name", 256)?;
    for file in &payload.files {
        validate_text(&file.file_name, "file_name", 256)?;
        validate_text(&file.file_path, "file_path", 1024)?;
        parse_http_url(&file.file_url)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MaterialFileResponse {
    pub id: i32,
    pub material_id: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_url: String,
}

impl From<material_file::Model> for MaterialFileResponse {
    fn from(f: material_file::Model) -> Self {
        Self {
            id: f.id,
            material_id: f.material_id,
            file_name: f.file_name,
            file_path: f.file_path,
            file_url: f.file_url,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MaterialResponse {
    pub id: i32,
    pub course_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<MaterialFileResponse>,
}

impl MaterialResponse {
    pub fn new(m: material::Model, files: Vec<material_file::Model>) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            name: m.name,
            created_at: m.created_at,
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Material row joined with the name of its course.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecentMaterialItem {
    pub id: i32,
    pub name: String,
    pub course_id: i32,
    pub course_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RecentMaterialsQuery {
    /// Maximum number of materials to return (1-100, default 10).
    pub limit: Option<u64>,
}
