use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use genai::{Content, Part};
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

use super::course::find_course;
use super::generate_text;
use crate::entity::{additional_discussion_file, discussion, discussion_file, material, material_file};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::ApiResponse;
use crate::models::discussion::*;
use crate::state::AppState;
use crate::utils::history::conversation;
use crate::utils::ingest::{PdfSource, ingest_pdf, parse_http_url};
use crate::utils::prompt;

/// File type recorded for student uploads.
const UPLOAD_FILE_TYPE: &str = "pdf";

#[utoipa::path(
    get,
    path = "/",
    tag = "Discussion",
    operation_id = "listDiscussion",
    summary = "List the caller's discussion turns in a course",
    description = "Returns every turn of the current student's conversation in this course, oldest \
        first, with the files attached to each turn.",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Discussion turns", body = ApiResponse<Vec<DiscussionResponse>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Course not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_discussion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<DiscussionResponse>>>, AppError> {
    find_course(&state.db, course_id).await?;

    let turns = history(&state.db, course_id, auth_user.user_id).await?;
    let ids: Vec<i32> = turns.iter().map(|t| t.id).collect();
    let (mut files, mut additional) = load_attachments(&state.db, ids).await?;

    let data = turns
        .into_iter()
        .map(|t| {
            let f = files.remove(&t.id).unwrap_or_default();
            let a = additional.remove(&t.id).unwrap_or_default();
            DiscussionResponse::new(t, f, a)
        })
        .collect();

    Ok(Json(ApiResponse::new("Success get discussion", data)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Discussion",
    operation_id = "createDiscussion",
    summary = "Ask a question in the course discussion",
    description = "Answers `prompt` with the student's earlier turns in this course as context. \
        When files are attached, each is described by the model first and the answer is based on \
        those descriptions. The turn and its attachment records are stored in one transaction.",
    params(("course_id" = i32, Path, description = "Course ID")),
    request_body = CreateDiscussionRequest,
    responses(
        (status = 201, description = "Turn created", body = ApiResponse<DiscussionResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Course or material file not found", body = ErrorBody),
        (status = 500, description = "Generative AI request failed", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, attachments = payload.file.len()))]
pub async fn create_discussion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateDiscussionRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_course(&state.db, course_id).await?;
    validate_create_discussion(&payload)?;

    let prompt_text = payload.prompt.trim().to_string();

    // Resolve material attachments before spending any model calls.
    let mut material_files = HashMap::new();
    for attachment in &payload.file {
        if let (AttachmentOrigin::Material, Some(id)) = (attachment.from, attachment.id) {
            let file = find_course_material_file(&state.db, course_id, id).await?;
            material_files.insert(id, file);
        }
    }

    let turns = history(&state.db, course_id, auth_user.user_id).await?;

    let question = if payload.file.is_empty() {
        prompt_text.clone()
    } else {
        let mut descriptions = Vec::with_capacity(payload.file.len());
        for (index, attachment) in payload.file.iter().enumerate() {
            let url = match attachment.id.and_then(|id| material_files.get(&id)) {
                Some(file) if attachment.from == AttachmentOrigin::Material => &file.file_url,
                _ => &attachment.path,
            };
            let source = PdfSource::Url(parse_http_url(url)?);
            let file = ingest_pdf(&state, source, &format!("discussion_file_{index}")).await?;
            let description = generate_text(
                &state,
                &[Content::user(vec![
                    Part::text(prompt::DESCRIBE_DOCUMENT),
                    file.file_part()?,
                ])],
            )
            .await?;
            descriptions.push((attachment.name.trim().to_string(), description));
        }
        prompt::attachment_question(
            &prompt_text,
            descriptions.iter().map(|(n, d)| (n.as_str(), d.as_str())),
        )
    };

    let answer = generate_text(&state, &conversation(&turns, &question)).await?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let turn = discussion::ActiveModel {
        course_id: Set(course_id),
        student_id: Set(auth_user.user_id),
        prompt: Set(prompt_text),
        answer: Set(answer),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut files = Vec::new();
    let mut additional = Vec::new();
    for attachment in payload.file {
        match attachment.from {
            AttachmentOrigin::Material => {
                let Some(mf) = attachment.id.and_then(|id| material_files.remove(&id)) else {
                    continue; // Same material file attached twice.
                };
                let row = discussion_file::ActiveModel {
                    discussion_id: Set(turn.id),
                    material_file_id: Set(mf.id),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                files.push(DiscussionFileResponse {
                    id: row.id,
                    material_file_id: mf.id,
                    file_name: mf.file_name,
                    file_url: mf.file_url,
                });
            }
            AttachmentOrigin::Upload => {
                let row = additional_discussion_file::ActiveModel {
                    discussion_id: Set(turn.id),
                    file_name: Set(attachment.name.trim().to_string()),
                    file_type: Set(UPLOAD_FILE_TYPE.to_string()),
                    file_path: Set(attachment.path.trim().to_string()),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                additional.push(row);
            }
        }
    }

    txn.commit().await?;
    info!(discussion_id = turn.id, "Discussion turn stored");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Success insert data",
            DiscussionResponse::new(turn, files, additional),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/{discussion_id}/regenerate",
    tag = "Discussion",
    operation_id = "regenerateDiscussion",
    summary = "Regenerate or edit a discussion turn",
    description = "Generates a new answer for an existing turn using only the turns before it as \
        context. With `prompt` the stored prompt is replaced first (edit); without it the stored \
        prompt is reused (regenerate). The turn is updated in place.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("discussion_id" = i32, Path, description = "Discussion turn ID"),
    ),
    request_body = RegenerateDiscussionRequest,
    responses(
        (status = 200, description = "Turn updated", body = ApiResponse<DiscussionResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Discussion turn not found", body = ErrorBody),
        (status = 500, description = "Generative AI request failed", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, edit = payload.prompt.is_some()))]
pub async fn regenerate_discussion(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, discussion_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<RegenerateDiscussionRequest>,
) -> Result<Json<ApiResponse<DiscussionResponse>>, AppError> {
    if let Some(prompt) = &payload.prompt {
        validate_prompt(prompt)?;
    }

    let turn = discussion::Entity::find_by_id(discussion_id)
        .filter(discussion::Column::CourseId.eq(course_id))
        .filter(discussion::Column::StudentId.eq(auth_user.user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Discussion not found".into()))?;

    let prompt_text = payload
        .prompt
        .map(|p| p.trim().to_string())
        .unwrap_or_else(|| turn.prompt.clone());

    let earlier = discussion::Entity::find()
        .filter(discussion::Column::CourseId.eq(course_id))
        .filter(discussion::Column::StudentId.eq(auth_user.user_id))
        .filter(
            Condition::any()
                .add(discussion::Column::CreatedAt.lt(turn.created_at))
                .add(
                    Condition::all()
                        .add(discussion::Column::CreatedAt.eq(turn.created_at))
                        .add(discussion::Column::Id.lt(turn.id)),
                ),
        )
        .order_by_asc(discussion::Column::CreatedAt)
        .order_by_asc(discussion::Column::Id)
        .all(&state.db)
        .await?;

    let answer = generate_text(&state, &conversation(&earlier, &prompt_text)).await?;

    let mut active: discussion::ActiveModel = turn.into();
    active.prompt = Set(prompt_text);
    active.answer = Set(answer);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    let (mut files, mut additional) = load_attachments(&state.db, vec![updated.id]).await?;
    let f = files.remove(&updated.id).unwrap_or_default();
    let a = additional.remove(&updated.id).unwrap_or_default();

    Ok(Json(ApiResponse::new(
        "Success update data",
        DiscussionResponse::new(updated, f, a),
    )))
}

/// All turns of a student's conversation in a course, oldest first.
async fn history<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    student_id: Uuid,
) -> Result<Vec<discussion::Model>, AppError> {
    Ok(discussion::Entity::find()
        .filter(discussion::Column::CourseId.eq(course_id))
        .filter(discussion::Column::StudentId.eq(student_id))
        .order_by_asc(discussion::Column::CreatedAt)
        .order_by_asc(discussion::Column::Id)
        .all(db)
        .await?)
}

/// A material file, required to belong to one of the course's materials.
async fn find_course_material_file<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    material_file_id: i32,
) -> Result<material_file::Model, AppError> {
    let found = material_file::Entity::find_by_id(material_file_id)
        .find_also_related(material::Entity)
        .one(db)
        .await?;

    match found {
        Some((file, Some(m))) if m.course_id == course_id => Ok(file),
        _ => Err(AppError::NotFound(format!(
            "Material file {material_file_id} not found in this course"
        ))),
    }
}

type AttachmentMaps = (
    HashMap<i32, Vec<DiscussionFileResponse>>,
    HashMap<i32, Vec<additional_discussion_file::Model>>,
);

async fn load_attachments<C: ConnectionTrait>(
    db: &C,
    discussion_ids: Vec<i32>,
) -> Result<AttachmentMaps, AppError> {
    let mut files: HashMap<i32, Vec<DiscussionFileResponse>> = HashMap::new();
    let mut additional: HashMap<i32, Vec<additional_discussion_file::Model>> = HashMap::new();
    if discussion_ids.is_empty() {
        return Ok((files, additional));
    }

    let rows = discussion_file::Entity::find()
        .filter(discussion_file::Column::DiscussionId.is_in(discussion_ids.clone()))
        .find_also_related(material_file::Entity)
        .order_by_asc(discussion_file::Column::Id)
        .all(db)
        .await?;
    for (df, mf) in rows {
        let (file_name, file_url) = mf.map(|m| (m.file_name, m.file_url)).unwrap_or_default();
        files.entry(df.discussion_id).or_default().push(DiscussionFileResponse {
            id: df.id,
            material_file_id: df.material_file_id,
            file_name,
            file_url,
        });
    }

    let rows = additional_discussion_file::Entity::find()
        .filter(additional_discussion_file::Column::DiscussionId.is_in(discussion_ids))
        .order_by_asc(additional_discussion_file::Column::Id)
        .all(db)
        .await?;
    for row in rows {
        additional.entry(row.discussion_id).or_default().push(row);
    }

    Ok((files, additional))
}
