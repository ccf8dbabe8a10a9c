//! Mentor profile model and DTOs.

use mentorhub_core::matching::MentorCandidate;
use mentorhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `mentors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mentor {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub bio: Option<String>,
    pub segments: Vec<String>,
    pub accepting_bookings: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A mentor together with its count of upcoming SCHEDULED bookings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MentorWithLoad {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub bio: Option<String>,
    pub segments: Vec<String>,
    pub accepting_bookings: bool,
    pub upcoming_bookings: i64,
}

impl MentorWithLoad {
    pub fn candidate(&self) -> MentorCandidate {
        MentorCandidate {
            mentor_id: self.id,
            segments: self.segments.clone(),
            accepting_bookings: self.accepting_bookings,
            upcoming_bookings: self.upcoming_bookings,
        }
    }
}

/// DTO for creating a mentor profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMentor {
    pub user_id: DbId,
    pub display_name: String,
    pub bio: Option<String>,
    pub segments: Vec<String>,
}

/// DTO for updating a mentor profile. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMentor {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub segments: Option<Vec<String>>,
    pub accepting_bookings: Option<bool>,
}
