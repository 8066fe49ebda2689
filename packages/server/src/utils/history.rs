use genai::Content;

use crate::entity::discussion;

/// Replay earlier turns as alternating user/model contents and append `prompt`.
///
/// `turns` must already be in chronological order.
pub fn conversation(turns: &[discussion::Model], prompt: &str) -> Vec<Content> {
    let mut contents = Vec::with_capacity(turns.len() * 2 + 1);
    for turn in turns {
        contents.push(Content::user_text(turn.prompt.clone()));
        contents.push(Content::model_text(turn.answer.clone()));
    }
    contents.push(Content::user_text(prompt));
    contents
}
