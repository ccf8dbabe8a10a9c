//! Onboarding: professional segments and profile completion rules.

use crate::error::CoreError;

/// Student or recent graduate.
pub const SEGMENT_STUDENT: &str = "student";
/// Under three years of professional experience.
pub const SEGMENT_EARLY_CAREER: &str = "early_career";
/// Individual contributor with several years of experience.
pub const SEGMENT_MID_CAREER: &str = "mid_career";
/// People manager or senior specialist.
pub const SEGMENT_SENIOR: &str = "senior";
/// Director level and above.
pub const SEGMENT_EXECUTIVE: &str = "executive";
/// Moving into a new field.
pub const SEGMENT_CAREER_SWITCHER: &str = "career_switcher";

/// All valid segment keys.
pub const VALID_SEGMENTS: &[&str] = &[
    SEGMENT_STUDENT,
    SEGMENT_EARLY_CAREER,
    SEGMENT_MID_CAREER,
    SEGMENT_SENIOR,
    SEGMENT_EXECUTIVE,
    SEGMENT_CAREER_SWITCHER,
];

/// Validate that a segment is one of the known keys.
pub fn validate_segment(segment: &str) -> Result<(), CoreError> {
    if VALID_SEGMENTS.contains(&segment) {
        Ok(())
    } else {
        Err(CoreError::Invalid(format!(
            "Invalid segment '{segment}'. Must be one of: {}",
            VALID_SEGMENTS.join(", ")
        )))
    }
}

/// Validate every segment in a list and reject an empty list.
pub fn validate_segments(segments: &[String]) -> Result<(), CoreError> {
    if segments.is_empty() {
        return Err(CoreError::Invalid(
            "At least one segment is required".to_string(),
        ));
    }
    segments.iter().try_for_each(|s| validate_segment(s))
}

/// Features gated behind a finished onboarding must call this first.
pub fn ensure_onboarded(onboarding_complete: bool) -> Result<(), CoreError> {
    if onboarding_complete {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Complete onboarding before using this feature".to_string(),
        ))
    }
}
