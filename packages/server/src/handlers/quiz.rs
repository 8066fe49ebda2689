use std::collections::HashMap;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use genai::{Content, Part, RemoteFile};
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::*;
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::course::find_course;
use super::{MAX_UPLOAD_FILES, generate_text};
use crate::entity::{quiz, quiz_answer, quiz_question, quiz_result};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::ApiResponse;
use crate::models::quiz::*;
use crate::state::AppState;
use crate::utils::ingest::{PdfSource, ingest_pdf, parse_http_url, read_pdf_field};
use crate::utils::quiz_content::parse_questions;
use crate::utils::{prompt, scoring};

#[utoipa::path(
    get,
    path = "/",
    tag = "Quiz",
    operation_id = "listQuizzes",
    summary = "List the caller's quizzes in a course",
    description = "Returns the current student's quizzes for this course, newest first, with the \
        score of finished ones.",
    params(("course_id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of quizzes", body = ApiResponse<Vec<QuizResponse>>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Course not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_quizzes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<QuizResponse>>>, AppError> {
    find_course(&state.db, course_id).await?;

    let rows = quiz::Entity::find()
        .filter(quiz::Column::CourseId.eq(course_id))
        .filter(quiz::Column::StudentId.eq(auth_user.user_id))
        .find_also_related(quiz_result::Entity)
        .order_by_desc(quiz::Column::CreatedAt)
        .order_by_desc(quiz::Column::Id)
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|(q, r)| QuizResponse::new(q, r.map(|r| r.total_point)))
        .collect();

    Ok(Json(ApiResponse::new("Success get quizzes", data)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Quiz",
    operation_id = "createQuiz",
    summary = "Generate a quiz from PDFs",
    description = "Generates a multiple-choice quiz from the PDFs at the URLs in `material_files` (a \
        JSON array string, required) and any PDFs uploaded as repeated `additional_files` fields. \
        Files that fail to process are skipped; the request fails if none remain. The quiz and its \
        questions are stored in one transaction after generation succeeds.",
    params(("course_id" = i32, Path, description = "Course ID")),
    request_body(content_type = "multipart/form-data", description = "`material_files` (JSON array of PDF URLs) and `additional_files` (PDF uploads)"),
    responses(
        (status = 201, description = "Quiz generated", body = ApiResponse<QuizDetailResponse>),
        (status = 400, description = "Validation error or no file could be processed", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Course not found", body = ErrorBody),
        (status = 500, description = "Generative AI request failed", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn create_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    find_course(&state.db, course_id).await?;

    let mut material_urls: Option<Vec<Url>> = None;
    let mut uploads = Vec::new();
    let mut skipped_uploads = 0;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("material_files") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read material_files: {e}"))
                })?;
                material_urls = Some(parse_material_files(&text)?);
            }
            Some("additional_files") => {
                let index = uploads.len() + skipped_uploads;
                match read_pdf_field(field, state.config.upload.max_file_size).await {
                    Ok((file_name, bytes)) => uploads.push(PdfSource::Upload { file_name, bytes }),
                    Err(e) => {
                        warn!(index, "Skipping additional file that could not be read: {:?}", e);
                        skipped_uploads += 1;
                    }
                }
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let material_urls = material_urls.ok_or_else(|| {
        AppError::Validation("material_files field is required and must be a string".into())
    })?;
    if material_urls.len() + uploads.len() + skipped_uploads > MAX_UPLOAD_FILES {
        return Err(AppError::Validation(format!(
            "At most {MAX_UPLOAD_FILES} files may be used for one quiz"
        )));
    }

    let sources = material_urls
        .into_iter()
        .enumerate()
        .map(|(i, url)| (format!("material_file_{i}"), PdfSource::Url(url)))
        .chain(
            uploads
                .into_iter()
                .enumerate()
                .map(|(i, upload)| (format!("additional_file_{i}"), upload)),
        );

    let mut files: Vec<RemoteFile> = Vec::new();
    for (display_name, source) in sources {
        match ingest_pdf(&state, source, &display_name).await {
            Ok(file) => files.push(file),
            Err(e) => warn!(%display_name, "Skipping file that failed to process: {:?}", e),
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest {
            message: "No valid files were processed".into(),
            detail: "All file uploads failed or no files were provided".into(),
        });
    }

    let file_parts = files
        .iter()
        .map(RemoteFile::file_part)
        .collect::<Result<Vec<Part>, _>>()?;

    let title = generate_text(&state, &[with_files(prompt::TITLE.to_string(), &file_parts)])
        .await
        .map_err(|e| with_message(e, "Error while generating title"))?;

    let question_count = state.config.quiz.question_count;
    let raw = generate_text(
        &state,
        &[with_files(prompt::quiz(question_count), &file_parts)],
    )
    .await
    .map_err(|e| with_message(e, "Error while generating quiz"))?;
    let generated = parse_questions(&raw, question_count)
        .map_err(|e| AppError::upstream("Error while generating quiz", e))?;

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let quiz_model = quiz::ActiveModel {
        course_id: Set(course_id),
        student_id: Set(auth_user.user_id),
        title: Set(title),
        question_count: Set(generated.len() as i32),
        point_per_question: Set(state.config.quiz.point_per_question),
        attended: Set(false),
        finished: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let rows = generated.into_iter().map(|q| quiz_question::ActiveModel {
        quiz_id: Set(quiz_model.id),
        number: Set(q.number),
        question: Set(q.question),
        option_a: Set(q.option_a),
        option_b: Set(q.option_b),
        option_c: Set(q.option_c),
        option_d: Set(q.option_d),
        correct_answer: Set(q.correct_answer),
        created_at: Set(now),
        ..Default::default()
    });
    quiz_question::Entity::insert_many(rows).exec(&txn).await?;

    let questions = questions_of(&txn, quiz_model.id).await?;
    txn.commit().await?;

    info!(quiz_id = quiz_model.id, questions = questions.len(), "Quiz generated");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Quiz generated successfully",
            QuizDetailResponse {
                quiz: QuizResponse::new(quiz_model, None),
                questions: questions
                    .into_iter()
                    .map(|q| QuizQuestionResponse::new(q, None, false))
                    .collect(),
            },
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/{quiz_id}",
    tag = "Quiz",
    operation_id = "getQuiz",
    summary = "Get a quiz with its questions and answers",
    description = "Correct answers are included only once the quiz is finished.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("quiz_id" = i32, Path, description = "Quiz ID"),
    ),
    responses(
        (status = 200, description = "Quiz details", body = ApiResponse<QuizDetailResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Quiz not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, quiz_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<QuizDetailResponse>>, AppError> {
    let quiz_model = find_quiz(&state.db, course_id, quiz_id, auth_user.user_id).await?;
    let questions = questions_of(&state.db, quiz_id).await?;

    let ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
    let mut answers: HashMap<i32, quiz_answer::Model> = quiz_answer::Entity::find()
        .filter(quiz_answer::Column::QqId.is_in(ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.qq_id, a))
        .collect();

    let result = quiz_result::Entity::find()
        .filter(quiz_result::Column::QuizId.eq(quiz_id))
        .one(&state.db)
        .await?;

    let reveal = quiz_model.finished;
    let questions = questions
        .into_iter()
        .map(|q| {
            let answer = answers.remove(&q.id);
            QuizQuestionResponse::new(q, answer, reveal)
        })
        .collect();

    Ok(Json(ApiResponse::new(
        "Success get quiz",
        QuizDetailResponse {
            quiz: QuizResponse::new(quiz_model, result.map(|r| r.total_point)),
            questions,
        },
    )))
}

#[utoipa::path(
    delete,
    path = "/{quiz_id}",
    tag = "Quiz",
    operation_id = "deleteQuiz",
    summary = "Delete a quiz",
    description = "Deletes the quiz with its answers, result and questions in one transaction.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("quiz_id" = i32, Path, description = "Quiz ID"),
    ),
    responses(
        (status = 200, description = "Quiz deleted", body = ApiResponse<QuizResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Quiz not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, quiz_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<QuizResponse>>, AppError> {
    let txn = state.db.begin().await?;
    let quiz_model = find_quiz_for_update(&txn, course_id, quiz_id, auth_user.user_id).await?;

    let ids: Vec<i32> = questions_of(&txn, quiz_id)
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect();

    quiz_answer::Entity::delete_many()
        .filter(quiz_answer::Column::QqId.is_in(ids))
        .exec(&txn)
        .await?;
    quiz_result::Entity::delete_many()
        .filter(quiz_result::Column::QuizId.eq(quiz_id))
        .exec(&txn)
        .await?;
    quiz_question::Entity::delete_many()
        .filter(quiz_question::Column::QuizId.eq(quiz_id))
        .exec(&txn)
        .await?;
    quiz::Entity::delete_by_id(quiz_id).exec(&txn).await?;

    txn.commit().await?;

    Ok(Json(ApiResponse::new(
        "Quiz deleted",
        QuizResponse::new(quiz_model, None),
    )))
}

#[utoipa::path(
    post,
    path = "/{quiz_id}/attend",
    tag = "Quiz",
    operation_id = "attendQuiz",
    summary = "Mark a quiz as attended",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("quiz_id" = i32, Path, description = "Quiz ID"),
    ),
    responses(
        (status = 200, description = "Quiz attended", body = ApiResponse<QuizResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Quiz not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn attend_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, quiz_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<QuizResponse>>, AppError> {
    let quiz_model = find_quiz(&state.db, course_id, quiz_id, auth_user.user_id).await?;
    let quiz_model = mark_attended(&state.db, quiz_model).await?;

    Ok(Json(ApiResponse::new(
        "Quiz attended",
        QuizResponse::new(quiz_model, None),
    )))
}

#[utoipa::path(
    get,
    path = "/{quiz_id}/questions/{number}",
    tag = "Quiz",
    operation_id = "getQuizQuestion",
    summary = "Open a quiz question",
    description = "Returns one question with the caller's answer so far and marks the quiz attended. \
        The correct answer is included only once the quiz is finished.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("quiz_id" = i32, Path, description = "Quiz ID"),
        ("number" = i32, Path, description = "Question number, starting at 1"),
    ),
    responses(
        (status = 200, description = "Quiz question", body = ApiResponse<QuizQuestionResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Quiz or question not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, quiz_id, number)): Path<(i32, i32, i32)>,
) -> Result<Json<ApiResponse<QuizQuestionResponse>>, AppError> {
    let quiz_model = find_quiz(&state.db, course_id, quiz_id, auth_user.user_id).await?;
    let question = find_question(&state.db, quiz_id, number).await?;
    let quiz_model = mark_attended(&state.db, quiz_model).await?;

    let answer = quiz_answer::Entity::find()
        .filter(quiz_answer::Column::QqId.eq(question.id))
        .one(&state.db)
        .await?;

    Ok(Json(ApiResponse::new(
        "Success get question",
        QuizQuestionResponse::new(question, answer, quiz_model.finished),
    )))
}

#[utoipa::path(
    put,
    path = "/{quiz_id}/questions/{number}/answer",
    tag = "Quiz",
    operation_id = "answerQuizQuestion",
    summary = "Answer a quiz question",
    description = "Stores the chosen option, replacing any earlier answer to the same question. \
        Rejected once the quiz is finished.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("quiz_id" = i32, Path, description = "Quiz ID"),
        ("number" = i32, Path, description = "Question number, starting at 1"),
    ),
    request_body = AnswerQuestionRequest,
    responses(
        (status = 200, description = "Answer stored", body = ApiResponse<QuizQuestionResponse>),
        (status = 400, description = "Invalid option or quiz already finished", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Quiz or question not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, option = %payload.option))]
pub async fn answer_question(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, quiz_id, number)): Path<(i32, i32, i32)>,
    AppJson(payload): AppJson<AnswerQuestionRequest>,
) -> Result<Json<ApiResponse<QuizQuestionResponse>>, AppError> {
    let option = scoring::normalize_option(&payload.option)
        .ok_or_else(|| AppError::Validation("option must be one of A, B, C, D".into()))?;

    let txn = state.db.begin().await?;
    let quiz_model = find_quiz_for_update(&txn, course_id, quiz_id, auth_user.user_id).await?;
    ensure_not_finished(&quiz_model)?;

    let question = find_question(&txn, quiz_id, number).await?;
    let chosen = scoring::option_text(&question, option)
        .unwrap_or_default()
        .to_string();
    let is_correct = scoring::is_correct(&question, &chosen);

    let now = Utc::now();
    let answer = quiz_answer::ActiveModel {
        qq_id: Set(question.id),
        student_id: Set(auth_user.user_id),
        chosen_option: Set(option.to_string()),
        student_answer: Set(chosen),
        is_correct: Set(is_correct),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    quiz_answer::Entity::insert(answer)
        .on_conflict(
            OnConflict::column(quiz_answer::Column::QqId)
                .update_columns([
                    quiz_answer::Column::StudentId,
                    quiz_answer::Column::ChosenOption,
                    quiz_answer::Column::StudentAnswer,
                    quiz_answer::Column::IsCorrect,
                    quiz_answer::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    mark_attended(&txn, quiz_model).await?;

    let saved = quiz_answer::Entity::find()
        .filter(quiz_answer::Column::QqId.eq(question.id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("quiz_answer missing after upsert".into()))?;

    txn.commit().await?;

    Ok(Json(ApiResponse::new(
        "Answer saved",
        QuizQuestionResponse::new(question, Some(saved), false),
    )))
}

#[utoipa::path(
    post,
    path = "/{quiz_id}/finish",
    tag = "Quiz",
    operation_id = "finishQuiz",
    summary = "Finish a quiz and compute its score",
    description = "Scores `point_per_question` for each correct answer; unanswered questions score \
        nothing. The quiz is marked finished and its result stored in one transaction. A quiz can \
        be finished only once.",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("quiz_id" = i32, Path, description = "Quiz ID"),
    ),
    responses(
        (status = 200, description = "Quiz finished", body = ApiResponse<QuizResultResponse>),
        (status = 400, description = "Quiz already finished", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Quiz not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn finish_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, quiz_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<QuizResultResponse>>, AppError> {
    let txn = state.db.begin().await?;
    let quiz_model = find_quiz_for_update(&txn, course_id, quiz_id, auth_user.user_id).await?;
    ensure_not_finished(&quiz_model)?;

    let ids: Vec<i32> = questions_of(&txn, quiz_id)
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect();
    let question_count = ids.len() as i32;

    let correct = quiz_answer::Entity::find()
        .filter(quiz_answer::Column::QqId.is_in(ids))
        .filter(quiz_answer::Column::IsCorrect.eq(true))
        .count(&txn)
        .await?;
    let total_point = scoring::total_points(correct, quiz_model.point_per_question);

    let mut active: quiz::ActiveModel = quiz_model.into();
    active.attended = Set(true);
    active.finished = Set(true);
    active.update(&txn).await?;

    let result = quiz_result::ActiveModel {
        quiz_id: Set(quiz_id),
        student_id: Set(auth_user.user_id),
        total_point: Set(total_point),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(total_point, correct, "Quiz finished");

    Ok(Json(ApiResponse::new(
        "Quiz finished",
        QuizResultResponse {
            quiz_id,
            total_point: result.total_point,
            correct_count: correct as i32,
            question_count,
            created_at: result.created_at,
        },
    )))
}

/// Parse the `material_files` form field: a JSON string holding an array of URLs.
fn parse_material_files(text: &str) -> Result<Vec<Url>, AppError> {
    let value: Value = serde_json::from_str(text).map_err(|_| {
        AppError::Validation("material_files must be a valid JSON string".into())
    })?;
    let items = value.as_array().ok_or_else(|| {
        AppError::Validation("material_files must be a JSON string containing an array".into())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .and_then(|s| parse_http_url(s).ok())
                .ok_or_else(|| {
                    AppError::Validation(format!("Invalid URL at index {index}: {item}"))
                })
        })
        .collect()
}

fn with_files(instruction: String, file_parts: &[Part]) -> Content {
    let mut parts = Vec::with_capacity(file_parts.len() + 1);
    parts.push(Part::text(instruction));
    parts.extend_from_slice(file_parts);
    Content::user(parts)
}

/// Replace the summary of an upstream failure, keeping its detail.
fn with_message(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Upstream { detail, .. } => AppError::Upstream {
            message: message.into(),
            detail,
        },
        other => other,
    }
}

fn ensure_not_finished(quiz_model: &quiz::Model) -> Result<(), AppError> {
    if quiz_model.finished {
        return Err(AppError::BadRequest {
            message: "Quiz already finished".into(),
            detail: format!("Quiz {} no longer accepts changes", quiz_model.id),
        });
    }
    Ok(())
}

async fn mark_attended<C: ConnectionTrait>(
    db: &C,
    quiz_model: quiz::Model,
) -> Result<quiz::Model, AppError> {
    if quiz_model.attended {
        return Ok(quiz_model);
    }
    let mut active: quiz::ActiveModel = quiz_model.into();
    active.attended = Set(true);
    Ok(active.update(db).await?)
}

async fn questions_of<C: ConnectionTrait>(
    db: &C,
    quiz_id: i32,
) -> Result<Vec<quiz_question::Model>, AppError> {
    Ok(quiz_question::Entity::find()
        .filter(quiz_question::Column::QuizId.eq(quiz_id))
        .order_by_asc(quiz_question::Column::Number)
        .all(db)
        .await?)
}

async fn find_question<C: ConnectionTrait>(
    db: &C,
    quiz_id: i32,
    number: i32,
) -> Result<quiz_question::Model, AppError> {
    quiz_question::Entity::find()
        .filter(quiz_question::Column::QuizId.eq(quiz_id))
        .filter(quiz_question::Column::Number.eq(number))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

/// Find a quiz owned by `student_id` in `course_id`.
async fn find_quiz<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    quiz_id: i32,
    student_id: Uuid,
) -> Result<quiz::Model, AppError> {
    quiz::Entity::find_by_id(quiz_id)
        .filter(quiz::Column::CourseId.eq(course_id))
        .filter(quiz::Column::StudentId.eq(student_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".into()))
}

async fn find_quiz_for_update(
    txn: &DatabaseTransaction,
    course_id: i32,
    quiz_id: i32,
    student_id: Uuid,
) -> Result<quiz::Model, AppError> {
    quiz::Entity::find_by_id(quiz_id)
        .filter(quiz::Column::CourseId.eq(course_id))
        .filter(quiz::Column::StudentId.eq(student_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".into()))
}
