//! Booking model and DTOs.

use mentorhub_core::error::CoreError;
use mentorhub_core::status::{BookingStatus, StatusId};
use mentorhub_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `bookings` table joined with the mentor's user id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub user_id: DbId,
    pub mentor_id: DbId,
    /// `mentors.user_id` of the assigned mentor, for participant checks.
    pub mentor_user_id: DbId,
    pub subscription_id: DbId,
    pub status_id: StatusId,
    pub scheduled_at: Timestamp,
    pub duration_mins: i32,
    pub notes: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn status(&self) -> Result<BookingStatus, CoreError> {
        BookingStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Booking {} has unknown status_id {}",
                self.id, self.status_id
            ))
        })
    }
}

/// DTO for scheduling a booking.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub user_id: DbId,
    pub mentor_id: DbId,
    pub subscription_id: DbId,
    pub scheduled_at: Timestamp,
    pub duration_mins: i32,
    pub notes: Option<String>,
}
