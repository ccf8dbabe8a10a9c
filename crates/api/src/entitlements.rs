//! Entitlement resolution against the store.
//!
//! The decisions themselves live in `mentorhub_core::entitlement`; this
//! module loads what they need and runs the consumption compare-and-set.

use chrono::Utc;
use mentorhub_core::booking::{ensure_capacity, validate_transition};
use mentorhub_core::entitlement::{
    check_session_availability as resolve_availability, plan_consumption, resolve_tool_access,
    select_active, SessionAvailability, SubscriptionTerms, ToolAccessDecision,
};
use mentorhub_core::error::CoreError;
use mentorhub_core::packages::AccessLevel;
use mentorhub_core::status::BookingStatus;
use mentorhub_core::types::{DbId, Timestamp};
use mentorhub_db::models::booking::{Booking, CreateBooking};
use mentorhub_db::models::subscription::Subscription;
use mentorhub_db::repositories::{BookingRepo, PackageRepo, SubscriptionRepo, ToolRepo};
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};

/// Extra attempts after a lost compare-and-set on the consumed counter.
pub const CONSUME_RETRIES: u32 = 1;

async fn load_terms(pool: &PgPool, user_id: DbId) -> AppResult<Vec<SubscriptionTerms>> {
    Ok(SubscriptionRepo::list_for_user(pool, user_id)
        .await?
        .iter()
        .map(Subscription::terms)
        .collect())
}

/// Can `user_id` use `tool_id`, and at what level. Read-only.
pub async fn check_tool_access(
    pool: &PgPool,
    user_id: DbId,
    tool_id: DbId,
) -> AppResult<ToolAccessDecision> {
    ToolRepo::find_by_id(pool, tool_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tool",
            id: tool_id,
        }))?;

    let terms = load_terms(pool, user_id).await?;
    let now = Utc::now();
    let active = select_active(&terms, now)?;

    let rule = match active {
        Some(subscription) => PackageRepo::find_rule_level(pool, subscription.package_id, tool_id)
            .await?
            .map(|level| level.parse::<AccessLevel>())
            .transpose()?,
        None => None,
    };

    let decision = resolve_tool_access(active, rule);
    tracing::debug!(
        user_id,
        tool_id,
        allowed = decision.allowed,
        level = %decision.level,
        "Resolved tool access"
    );
    Ok(decision)
}

/// Remaining session quota for `user_id`. Read-only.
pub async fn check_session_availability(
    pool: &PgPool,
    user_id: DbId,
) -> AppResult<SessionAvailability> {
    let terms = load_terms(pool, user_id).await?;
    Ok(resolve_availability(&terms, Utc::now())?)
}

/// A booking the caller asked for, before admission.
#[derive(Debug)]
pub struct BookingRequest {
    pub user_id: DbId,
    pub mentor_id: DbId,
    pub scheduled_at: Timestamp,
    pub duration_mins: i32,
    pub notes: Option<String>,
}

/// Admit `request` against the caller's quota and store it as SCHEDULED.
///
/// The user's subscription rows are locked first, so concurrent admissions
/// for the same user run one after another and each counts the bookings
/// committed before it. Nothing is consumed.
pub async fn schedule_booking(pool: &PgPool, request: BookingRequest) -> AppResult<Booking> {
    let mut tx = pool.begin().await?;

    let terms: Vec<SubscriptionTerms> = SubscriptionRepo::lock_for_user(&mut *tx, request.user_id)
        .await?
        .iter()
        .map(Subscription::terms)
        .collect();
    let availability = resolve_availability(&terms, Utc::now())?;
    let outstanding = match availability.subscription_id {
        Some(subscription_id) => {
            BookingRepo::count_scheduled_for_subscription(&mut *tx, subscription_id).await?
        }
        None => 0,
    };
    let subscription_id = ensure_capacity(&availability, outstanding)?;

    let booking = BookingRepo::create(
        &mut *tx,
        &CreateBooking {
            user_id: request.user_id,
            mentor_id: request.mentor_id,
            subscription_id,
            scheduled_at: request.scheduled_at,
            duration_mins: request.duration_mins,
            notes: request.notes,
        },
    )
    .await?;

    tx.commit().await?;
    Ok(booking)
}

/// Consume one session unit for `user_id` on behalf of `booking`.
///
/// Runs on the caller's transaction. A lost compare-and-set is retried
/// [`CONSUME_RETRIES`] time(s) against a freshly read counter, then reported
/// as `Conflict`. Exhausted or expired terms are `Conflict` immediately.
pub async fn consume_session(
    conn: &mut PgConnection,
    user_id: DbId,
    booking: &Booking,
) -> AppResult<Subscription> {
    if booking.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Booking {} does not belong to user {user_id}",
            booking.id
        ))));
    }

    for attempt in 0..=CONSUME_RETRIES {
        let subscription = SubscriptionRepo::find_by_id(&mut *conn, booking.subscription_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Subscription",
                id: booking.subscription_id,
            }))?;
        if subscription.user_id != user_id {
            return Err(AppError::Core(CoreError::Internal(format!(
                "Booking {} draws on subscription {} owned by another user",
                booking.id, subscription.id
            ))));
        }

        let plan = plan_consumption(&subscription.terms(), Utc::now())?;
        if let Some(updated) =
            SubscriptionRepo::consume_session(&mut *conn, plan.subscription_id, plan.expected_consumed)
                .await?
        {
            tracing::info!(
                subscription_id = updated.id,
                booking_id = booking.id,
                user_id,
                consumed = updated.consumed_sessions,
                total = updated.total_sessions,
                "Session consumed"
            );
            return Ok(updated);
        }

        tracing::warn!(
            subscription_id = plan.subscription_id,
            booking_id = booking.id,
            attempt,
            "Consumed counter changed concurrently"
        );
    }

    Err(AppError::Core(CoreError::Conflict(format!(
        "Subscription {} was updated concurrently; retry the completion",
        booking.subscription_id
    ))))
}

/// A completed booking together with the subscription it drew on.
#[derive(Debug, serde::Serialize)]
pub struct CompletedSession {
    pub booking: Booking,
    pub subscription: Subscription,
}

/// Find a booking and check the caller may act on it.
async fn load_for_transition(
    conn: &mut PgConnection,
    booking_id: DbId,
    to: BookingStatus,
    authorize: impl FnOnce(&Booking) -> Result<(), CoreError>,
) -> AppResult<Booking> {
    let booking = BookingRepo::find_by_id(&mut *conn, booking_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id: booking_id,
        }))?;
    authorize(&booking)?;
    validate_transition(booking.status()?, to)?;
    Ok(booking)
}

/// SCHEDULED -> COMPLETED and consume one session, in one transaction.
pub async fn complete_booking(
    pool: &PgPool,
    booking_id: DbId,
    authorize: impl FnOnce(&Booking) -> Result<(), CoreError>,
) -> AppResult<CompletedSession> {
    let mut tx = pool.begin().await?;

    let booking =
        load_for_transition(&mut *tx, booking_id, BookingStatus::Completed, authorize).await?;

    // The conditional transition locks the booking row, so a second
    // completion of the same booking waits here and then finds it terminal.
    let booking = BookingRepo::transition(
        &mut *tx,
        booking.id,
        BookingStatus::Scheduled,
        BookingStatus::Completed,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Booking {booking_id} is no longer SCHEDULED"
        )))
    })?;

    let subscription = consume_session(&mut *tx, booking.user_id, &booking).await?;

    tx.commit().await?;
    tracing::info!(booking_id, user_id = booking.user_id, "Booking completed");

    Ok(CompletedSession {
        booking,
        subscription,
    })
}

/// SCHEDULED -> CANCELLED. Consumes nothing.
pub async fn cancel_booking(
    pool: &PgPool,
    booking_id: DbId,
    authorize: impl FnOnce(&Booking) -> Result<(), CoreError>,
) -> AppResult<Booking> {
    let mut tx = pool.begin().await?;

    load_for_transition(&mut *tx, booking_id, BookingStatus::Cancelled, authorize).await?;

    let booking = BookingRepo::transition(
        &mut *tx,
        booking_id,
        BookingStatus::Scheduled,
        BookingStatus::Cancelled,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Booking {booking_id} is no longer SCHEDULED"
        )))
    })?;

    tx.commit().await?;
    tracing::info!(booking_id, user_id = booking.user_id, "Booking cancelled");

    Ok(booking)
}
