use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use genai::GenAiError;
use sea_orm::DbErr;
use serde::Serialize;

/// Envelope returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable summary of what failed.
    #[schema(example = "Validation error")]
    pub message: String,
    /// Underlying cause, when one is worth showing.
    #[serde(rename = "detailError", skip_serializing_if = "Option::is_none")]
    #[schema(example = "prompt must not be empty")]
    pub detail_error: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Request data is invalid. Rendered as `Validation error` with the reason as detail.
    Validation(String),
    /// Request was understood but cannot be served as asked.
    BadRequest { message: String, detail: String },
    TokenMissing,
    TokenInvalid,
    Forbidden,
    NotFound(String),
    /// The generative-AI API or a remote file host failed.
    Upstream { message: String, detail: String },
    Internal(String),
}

impl AppError {
    pub fn upstream(message: impl Into<String>, detail: impl Display) -> Self {
        AppError::Upstream {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Validation error".into(),
                    detail_error: Some(detail),
                },
            ),
            AppError::BadRequest { message, detail } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message,
                    detail_error: Some(detail),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    message: "Authentication required".into(),
                    detail_error: None,
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    message: "Invalid or expired token".into(),
                    detail_error: None,
                },
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    message: "Insufficient permissions".into(),
                    detail_error: None,
                },
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message,
                    detail_error: None,
                },
            ),
            AppError::Upstream { message, detail } => {
                tracing::warn!(%detail, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message,
                        detail_error: Some(detail),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "An unexpected error occurred".into(),
                        detail_error: None,
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<GenAiError> for AppError {
    fn from(err: GenAiError) -> Self {
        AppError::upstream("Generative AI request failed", err)
    }
}
