use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use genai::{Content, Part};
use sea_orm::*;
use tracing::{info, instrument};

use super::{MAX_UPLOAD_FILES, generate_text};
use super::course::find_material;
use crate::entity::simplify_material;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::ApiResponse;
use crate::models::simplify::SimplifyMaterialResponse;
use crate::state::AppState;
use crate::utils::ingest::{PdfSource, ingest_pdf, parse_http_url, read_pdf_field};
use crate::utils::prompt;

#[utoipa::path(
    get,
    path = "/",
    tag = "Simplify Materials",
    operation_id = "listSimplifyMaterials",
    summary = "List the caller's simplifications of a material",
    description = "Returns the current student's simplified explanations of this material, newest first.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("material_id" = i32, Path, description = "Material ID"),
    ),
    responses(
        (status = 200, description = "Simplified materials", body = ApiResponse<Vec<SimplifyMaterialResponse>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Material not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_simplify_materials(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, material_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<Vec<SimplifyMaterialResponse>>>, AppError> {
    find_material(&state.db, course_id, material_id).await?;

    let rows = simplify_material::Entity::find()
        .filter(simplify_material::Column::MaterialId.eq(material_id))
        .filter(simplify_material::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(simplify_material::Column::CreatedAt)
        .order_by_desc(simplify_material::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Success get simplify materials",
        rows.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Simplify Materials",
    operation_id = "simplifyMaterial",
    summary = "Simplify material files with AI",
    description = "Summarises every PDF given as repeated `files` uploads or `urls` fields, condenses \
        the summaries into one easy-to-understand explanation and titles it. \
        At least one file or URL is required.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("material_id" = i32, Path, description = "Material ID"),
    ),
    request_body(content_type = "multipart/form-data", description = "`files` (PDF uploads) and/or `urls` (PDF URLs)"),
    responses(
        (status = 201, description = "Simplified material created", body = ApiResponse<SimplifyMaterialResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Material not found", body = ErrorBody),
        (status = 500, description = "Generative AI request failed", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn create_simplify_material(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, material_id)): Path<(i32, i32)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    find_material(&state.db, course_id, material_id).await?;

    let mut uploads = Vec::new();
    let mut urls = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("files") => {
                let (file_name, bytes) =
                    read_pdf_field(field, state.config.upload.max_file_size).await?;
                uploads.push(PdfSource::Upload { file_name, bytes });
            }
            Some("urls") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read urls: {e}")))?;
                if !text.trim().is_empty() {
                    urls.push(PdfSource::Url(parse_http_url(&text)?));
                }
            }
            _ => {} // Ignore unknown fields.
        }
        if uploads.len() + urls.len() > MAX_UPLOAD_FILES {
            return Err(AppError::Validation(format!(
                "At most {MAX_UPLOAD_FILES} files may be simplified at once"
            )));
        }
    }

    let sources: Vec<PdfSource> = uploads.into_iter().chain(urls).collect();
    if sources.is_empty() {
        return Err(AppError::Validation(
            "At least one of 'files' or 'urls' is required".into(),
        ));
    }

    let mut combined = String::new();
    for (index, source) in sources.into_iter().enumerate() {
        let file = ingest_pdf(&state, source, &format!("simplify_file_{index}")).await?;
        let summary = generate_text(
            &state,
            &[Content::user(vec![
                Part::text(prompt::SUMMARIZE_DOCUMENT),
                file.file_part()?,
            ])],
        )
        .await?;
        combined.push_str(&summary);
        combined.push_str("\n\n");
    }

    let explanation = generate_text(
        &state,
        &[Content::user_text(prompt::simplify_summaries(&combined))],
    )
    .await?;
    let title = generate_text(
        &state,
        &[Content::user_text(prompt::summary_title(&explanation))],
    )
    .await?;

    let model = simplify_material::ActiveModel {
        material_id: Set(material_id),
        student_id: Set(auth_user.user_id),
        title: Set(title),
        simplified_content: Set(explanation),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(id = model.id, "Simplified material stored");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Material simplified",
            SimplifyMaterialResponse::from(model),
        )),
    ))
}
