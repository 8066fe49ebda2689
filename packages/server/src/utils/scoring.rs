use crate::entity::quiz_question;

/// Letters a student may pick, in option order.
pub const OPTIONS: [&str; 4] = ["A", "B", "C", "D"];

/// Normalise a submitted option letter. Returns `None` for anything but A-D.
pub fn normalize_option(option: &str) -> Option<&'static str> {
    let option = option.trim();
    OPTIONS
        .iter()
        .copied()
        .find(|o| o.eq_ignore_ascii_case(option))
}

/// Text of the option a letter refers to.
pub fn option_text<'q>(question: &'q quiz_question::Model, option: &str) -> Option<&'q str> {
    match normalize_option(option)? {
        "A" => Some(&question.option_a),
        "B" => Some(&question.option_b),
        "C" => Some(&question.option_c),
        "D" => Some(&question.option_d),
        _ => None,
    }
}

/// Correct answers are stored as option text; compare ignoring surrounding whitespace.
pub fn is_correct(question: &quiz_question::Model, chosen_text: &str) -> bool {
    question.correct_answer.trim() == chosen_text.trim()
}

pub fn total_points(correct: u64, point_per_question: i32) -> i32 {
    i32::try_from(correct)
        .unwrap_or(i32::MAX)
        .saturating_mul(point_per_question)
}
