use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{quiz, quiz_answer, quiz_question};

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    pub id: i32,
    pub course_id: i32,
    #[schema(example = "Dasar-dasar Pohon Biner")]
    pub title: String,
    #[schema(example = 10)]
    pub question_count: i32,
    #[schema(example = 10)]
    pub point_per_question: i32,
    pub attended: bool,
    pub finished: bool,
    /// Score, once the quiz is finished.
    pub total_point: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl QuizResponse {
    pub fn new(q: quiz::Model, total_point: Option<i32>) -> Self {
        Self {
            id: q.id,
            course_id: q.course_id,
            title: q.title,
            question_count: q.question_count,
            point_per_question: q.point_per_question,
            attended: q.attended,
            finished: q.finished,
            total_point,
            created_at: q.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizAnswerResponse {
    /// Chosen option letter.
    #[schema(example = "B")]
    pub option: String,
    pub student_answer: String,
    /// Revealed once the quiz is finished.
    pub is_correct: Option<bool>,
}

impl QuizAnswerResponse {
    pub fn new(a: quiz_answer::Model, reveal: bool) -> Self {
        Self {
            option: a.chosen_option,
            student_answer: a.student_answer,
            is_correct: reveal.then_some(a.is_correct),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizQuestionResponse {
    pub id: i32,
    #[schema(example = 1)]
    pub number: i32,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Text of the right option. Hidden until the quiz is finished.
    pub correct_answer: Option<String>,
    pub answer: Option<QuizAnswerResponse>,
}

impl QuizQuestionResponse {
    /// Build the view of a question; `reveal` exposes the correct answer.
    pub fn new(q: quiz_question::Model, answer: Option<quiz_answer::Model>, reveal: bool) -> Self {
        Self {
            id: q.id,
            number: q.number,
            question: q.question,
            option_a: q.option_a,
            option_b: q.option_b,
            option_c: q.option_c,
            option_d: q.option_d,
            correct_answer: reveal.then_some(q.correct_answer),
            answer: answer.map(|a| QuizAnswerResponse::new(a, reveal)),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizDetailResponse {
    pub quiz: QuizResponse,
    pub questions: Vec<QuizQuestionResponse>,
}

/// Request body for answering a question.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnswerQuestionRequest {
    /// Option letter, `A` to `D`.
    #[schema(example = "C")]
    pub option: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResultResponse {
    pub quiz_id: i32,
    #[schema(example = 70)]
    pub total_point: i32,
    #[schema(example = 7)]
    pub correct_count: i32,
    #[schema(example = 10)]
    pub question_count: i32,
    pub created_at: DateTime<Utc>,
}
