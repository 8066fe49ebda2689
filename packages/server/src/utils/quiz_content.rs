use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

/// A question parsed out of model output, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    pub number: i32,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizContentError {
    #[error("failed to parse AI response as JSON: {0}")]
    InvalidJson(String),
    #[error("AI response is not an array")]
    NotAnArray,
    #[error("AI response contains no questions")]
    Empty,
    #[error("invalid quiz structure at index {index}: missing or empty '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// Remove a surrounding ```` ```json ```` or ```` ``` ```` fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse the model's answer to a quiz prompt.
///
/// A count different from `expected` is tolerated; an empty array is not.
pub fn parse_questions(
    text: &str,
    expected: usize,
) -> Result<Vec<GeneratedQuestion>, QuizContentError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| QuizContentError::InvalidJson(e.to_string()))?;

    let items = value.as_array().ok_or(QuizContentError::NotAnArray)?;
    if items.is_empty() {
        return Err(QuizContentError::Empty);
    }
    if items.len() != expected {
        tracing::warn!("Expected {} questions, got {}", expected, items.len());
    }

    let mut questions = items
        .iter()
        .enumerate()
        .map(|(index, item)| -> Result<GeneratedQuestion, QuizContentError> {
            let field = |name: &'static str| {
                required_text(item.get(name))
                    .ok_or(QuizContentError::MissingField { index, field: name })
            };
            Ok(GeneratedQuestion {
                number: question_number(item.get("number")).unwrap_or(index as i32 + 1),
                question: field("question")?,
                option_a: field("option_a")?,
                option_b: field("option_b")?,
                option_c: field("option_c")?,
                option_d: field("option_d")?,
                correct_answer: field("correct_answer")?,
            })
        })
        .collect::<Result<Vec<_>, QuizContentError>>()?;

    // Numbers key the stored questions, so they must be unique.
    let mut seen = HashSet::new();
    if !questions.iter().all(|q| seen.insert(q.number)) {
        tracing::warn!("AI response repeats question numbers, renumbering");
        for (index, q) in questions.iter_mut().enumerate() {
            q.number = index as i32 + 1;
        }
    }

    Ok(questions)
}

fn required_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn question_number(value: Option<&Value>) -> Option<i32> {
    let n = match value? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    i32::try_from(n).ok().filter(|n| *n > 0)
}
