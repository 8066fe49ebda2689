use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{course, material, material_file};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::ApiResponse;
use crate::models::course::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Courses",
    operation_id = "listCourses",
    summary = "List courses",
    description = "Returns all courses, newest first.",
    responses(
        (status = 200, description = "List of courses", body = ApiResponse<Vec<CourseResponse>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_courses(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, AppError> {
    let courses = course::Entity::find()
        .order_by_desc(course::Column::CreatedAt)
        .order_by_desc(course::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Success get courses",
        courses.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Courses",
    operation_id = "createCourse",
    summary = "Create a course",
    description = "Creates a new course. Requires the `admin` role.",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<CourseResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin(&state.db).await?;
    validate_create_course(&payload)?;

    let new_course = course::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        program: Set(payload.program.trim().to_string()),
        instructor: Set(payload.instructor.trim().to_string()),
        weeks: Set(payload.weeks.trim().to_string()),
        time_start: Set(payload.time_start.trim().to_string()),
        time_end: Set(payload.time_end.trim().to_string()),
        student_count: Set(payload.student_count),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_course.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Course created",
            CourseResponse::from(model),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/{course_id}",
    tag = "Courses",
    operation_id = "getCourse",
    summary = "Get a course",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = ApiResponse<CourseResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Course not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<CourseResponse>>, AppError> {
    let model = find_course(&state.db, course_id).await?;
    Ok(Json(ApiResponse::new("Success get course", model.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Materials",
    operation_id = "listMaterials",
    summary = "List materials of a course",
    description = "Returns the course's materials, oldest first, each with its files.",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of materials", body = ApiResponse<Vec<MaterialResponse>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Course not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_materials(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<MaterialResponse>>>, AppError> {
    find_course(&state.db, course_id).await?;

    let materials = material::Entity::find()
        .filter(material::Column::CourseId.eq(course_id))
        .order_by_asc(material::Column::CreatedAt)
        .order_by_asc(material::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = materials.iter().map(|m| m.id).collect();
    let mut files_by_material: HashMap<i32, Vec<material_file::Model>> = HashMap::new();
    if !ids.is_empty() {
        let files = material_file::Entity::find()
            .filter(material_file::Column::MaterialId.is_in(ids))
            .order_by_asc(material_file::Column::Id)
            .all(&state.db)
            .await?;
        for file in files {
            files_by_material.entry(file.material_id).or_default().push(file);
        }
    }

    let data = materials
        .into_iter()
        .map(|m| {
            let files = files_by_material.remove(&m.id).unwrap_or_default();
            MaterialResponse::new(m, files)
        })
        .collect();

    Ok(Json(ApiResponse::new("Success get materials", data)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Materials",
    operation_id = "createMaterial",
    summary = "Create a material",
    description = "Creates a material and its file records in one transaction. Requires the `admin` role.",
    params(("course_id" = i32, Path, description = "Course ID")),
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created", body = ApiResponse<MaterialResponse>),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Course not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_material(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateMaterialRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin(&state.db).await?;
    validate_create_material(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    find_course(&txn, course_id).await?;

    let model = material::ActiveModel {
        course_id: Set(course_id),
        name: Set(payload.name.trim().to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut files = Vec::with_capacity(payload.files.len());
    for file in payload.files {
        let saved = material_file::ActiveModel {
            material_id: Set(model.id),
            file_name: Set(file.file_name.trim().to_string()),
            file_path: Set(file.file_path.trim().to_string()),
            file_url: Set(file.file_url.trim().to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        files.push(saved);
    }

    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Material created",
            MaterialResponse::new(model, files),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/{material_id}",
    tag = "Materials",
    operation_id = "getMaterial",
    summary = "Get a material with its files",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("material_id" = i32, Path, description = "Material ID"),
    ),
    responses(
        (status = 200, description = "Material details", body = ApiResponse<MaterialResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Material not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_material(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, material_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MaterialResponse>>, AppError> {
    let model = find_material(&state.db, course_id, material_id).await?;
    let files = material_file::Entity::find()
        .filter(material_file::Column::MaterialId.eq(model.id))
        .order_by_asc(material_file::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Success get material",
        MaterialResponse::new(model, files),
    )))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Materials",
    operation_id = "listRecentMaterials",
    summary = "List recent materials across all courses",
    description = "Returns the newest materials together with the name of their course.",
    params(RecentMaterialsQuery),
    responses(
        (status = 200, description = "Recent materials", body = ApiResponse<Vec<RecentMaterialItem>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_recent_materials(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RecentMaterialsQuery>,
) -> Result<Json<ApiResponse<Vec<RecentMaterialItem>>>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let rows = material::Entity::find()
        .find_also_related(course::Entity)
        .order_by_desc(material::Column::CreatedAt)
        .order_by_desc(material::Column::Id)
        .limit(limit)
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|(m, c)| RecentMaterialItem {
            id: m.id,
            name: m.name,
            course_id: m.course_id,
            course_name: c.map(|c| c.name).unwrap_or_default(),
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new("Success get materials", data)))
}

pub(crate) async fn find_course<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<course::Model, AppError> {
    course::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

/// Find a material, requiring it to belong to `course_id`.
pub(crate) async fn find_material<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    material_id: i32,
) -> Result<material::Model, AppError> {
    material::Entity::find_by_id(material_id)
        .filter(material::Column::CourseId.eq(course_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material not found".into()))
}
