//! Mentor session booking rules and state machine.
//!
//! `SCHEDULED -> COMPLETED | CANCELLED`. Both targets are terminal.

use crate::entitlement::SessionAvailability;
use crate::error::CoreError;
use crate::roles::{Capability, Role};
use crate::status::BookingStatus;
use crate::types::{DbId, Timestamp};

/// Shortest bookable session, in minutes.
pub const MIN_DURATION_MINS: i32 = 15;

/// Longest bookable session, in minutes.
pub const MAX_DURATION_MINS: i32 = 180;

/// Default session length when the request omits one.
pub const DEFAULT_DURATION_MINS: i32 = 60;

/// Validate a booking state transition.
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> Result<(), CoreError> {
    match (from, to) {
        (BookingStatus::Scheduled, BookingStatus::Completed)
        | (BookingStatus::Scheduled, BookingStatus::Cancelled) => Ok(()),
        (BookingStatus::Completed, _) | (BookingStatus::Cancelled, _) => Err(
            CoreError::Conflict(format!("Booking is already {from} and cannot become {to}")),
        ),
        (BookingStatus::Scheduled, BookingStatus::Scheduled) => Err(CoreError::Conflict(
            "Booking is already SCHEDULED".to_string(),
        )),
    }
}

/// Only the subscriber or the assigned mentor may transition a booking.
/// Staff roles get no exemption here.
pub fn ensure_participant(
    caller_id: DbId,
    subscriber_id: DbId,
    mentor_user_id: DbId,
) -> Result<(), CoreError> {
    if caller_id == subscriber_id || caller_id == mentor_user_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only a booking participant may act on this booking".to_string(),
        ))
    }
}

/// Participants, and staff with [`Capability::ViewAllBookings`], may read a
/// booking.
pub fn ensure_can_view(
    caller_id: DbId,
    caller_role: Role,
    subscriber_id: DbId,
    mentor_user_id: DbId,
) -> Result<(), CoreError> {
    if caller_role.can(Capability::ViewAllBookings) {
        return Ok(());
    }
    ensure_participant(caller_id, subscriber_id, mentor_user_id)
}

/// Validate the requested slot.
pub fn validate_slot(
    scheduled_at: Timestamp,
    duration_mins: i32,
    now: Timestamp,
) -> Result<(), CoreError> {
    if scheduled_at <= now {
        return Err(CoreError::Invalid(
            "scheduled_at must be in the future".to_string(),
        ));
    }
    if !(MIN_DURATION_MINS..=MAX_DURATION_MINS).contains(&duration_mins) {
        return Err(CoreError::Invalid(format!(
            "duration_mins must be between {MIN_DURATION_MINS} and {MAX_DURATION_MINS}"
        )));
    }
    Ok(())
}

/// Admit a new booking against the caller's quota.
///
/// Scheduling does not consume a session, but outstanding SCHEDULED
/// bookings may not exceed what is left on the allotment.
pub fn ensure_capacity(
    availability: &SessionAvailability,
    outstanding_scheduled: i64,
) -> Result<DbId, CoreError> {
    let subscription_id = match (availability.allowed, availability.subscription_id) {
        (true, Some(id)) => id,
        _ => {
            let reason = availability
                .reason
                .map(|r| r.as_str())
                .unwrap_or("no session entitlement");
            return Err(CoreError::Forbidden(format!("Cannot book a session: {reason}")));
        }
    };
    if outstanding_scheduled >= i64::from(availability.remaining) {
        return Err(CoreError::Conflict(format!(
            "{outstanding_scheduled} scheduled booking(s) already cover the {} remaining session(s)",
            availability.remaining
        )));
    }
    Ok(subscription_id)
}
