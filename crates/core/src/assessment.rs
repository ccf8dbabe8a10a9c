//! Assessment tool definitions and server-side scoring.
//!
//! Scores are always recomputed here from the submitted responses. A score
//! sent by the client is only compared, never stored.

use crate::error::CoreError;
use crate::packages::AccessLevel;

/// Questions a TEASER grant may answer.
pub const TEASER_QUESTION_LIMIT: usize = 3;

/// Upper bound on questions per tool.
pub const MAX_QUESTION_COUNT: i32 = 200;

/// Upper bound on the per-question answer scale.
pub const MAX_ANSWER_VALUE: i32 = 100;

/// Maximum length of a tool slug.
pub const MAX_SLUG_LEN: usize = 64;

/// The scoring shape of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolShape {
    pub question_count: i32,
    /// Answers range over `0..=max_answer_value`.
    pub max_answer_value: i32,
}

/// Validate a tool definition before it is stored.
pub fn validate_tool_definition(slug: &str, name: &str, shape: ToolShape) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Invalid(format!(
            "Tool slug must be 1 to {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Invalid(format!(
            "Tool slug '{slug}' may only contain lowercase letters, digits and '-'"
        )));
    }
    if name.trim().is_empty() {
        return Err(CoreError::Invalid("Tool name must not be empty".into()));
    }
    if !(1..=MAX_QUESTION_COUNT).contains(&shape.question_count) {
        return Err(CoreError::Invalid(format!(
            "question_count must be between 1 and {MAX_QUESTION_COUNT}"
        )));
    }
    if !(1..=MAX_ANSWER_VALUE).contains(&shape.max_answer_value) {
        return Err(CoreError::Invalid(format!(
            "max_answer_value must be between 1 and {MAX_ANSWER_VALUE}"
        )));
    }
    Ok(())
}

/// Number of answers an attempt at `level` must contain.
pub fn expected_answer_count(shape: ToolShape, level: AccessLevel) -> Result<usize, CoreError> {
    let total = usize::try_from(shape.question_count).unwrap_or(0);
    match level {
        AccessLevel::Full => Ok(total),
        AccessLevel::Teaser => Ok(total.min(TEASER_QUESTION_LIMIT)),
        AccessLevel::Locked => Err(CoreError::Forbidden("Tool is locked".into())),
    }
}

/// Validate an attempt's responses for the granted access level.
pub fn validate_responses(
    shape: ToolShape,
    level: AccessLevel,
    responses: &[i32],
) -> Result<(), CoreError> {
    let expected = expected_answer_count(shape, level)?;
    if responses.len() != expected {
        return Err(CoreError::Invalid(format!(
            "Expected {expected} responses at {level} access, got {}",
            responses.len()
        )));
    }
    if let Some((idx, value)) = responses
        .iter()
        .enumerate()
        .find(|(_, v)| !(0..=shape.max_answer_value).contains(*v))
    {
        return Err(CoreError::Invalid(format!(
            "Response {idx} is {value}; answers must be between 0 and {}",
            shape.max_answer_value
        )));
    }
    Ok(())
}

/// Score an attempt as a rounded percentage of the maximum attainable.
///
/// Callers validate first; an empty attempt scores 0.
pub fn compute_score(shape: ToolShape, responses: &[i32]) -> i32 {
    if responses.is_empty() || shape.max_answer_value <= 0 {
        return 0;
    }
    let sum: i64 = responses.iter().map(|v| i64::from(*v)).sum();
    let max = responses.len() as i64 * i64::from(shape.max_answer_value);
    // Integer half-up rounding of sum * 100 / max.
    ((sum * 200 + max) / (2 * max)) as i32
}

/// Whether a client-reported score disagrees with the server score.
pub fn client_score_diverges(server_score: i32, client_score: Option<i32>) -> bool {
    client_score.is_some_and(|c| c != server_score)
}
