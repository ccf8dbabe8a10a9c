//! Repository for the `bookings` table.
//!
//! Every read joins `mentors` so callers get the mentor's user id for
//! participant checks without a second round trip.

use mentorhub_core::status::BookingStatus;
use mentorhub_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::booking::{Booking, CreateBooking};

/// Column list over `bookings b JOIN mentors m`.
const COLUMNS: &str = "b.id, b.user_id, b.mentor_id, m.user_id AS mentor_user_id, \
                        b.subscription_id, b.status_id, b.scheduled_at, b.duration_mins, \
                        b.notes, b.completed_at, b.cancelled_at, b.created_at, b.updated_at";

/// Provides booking persistence and the conditional status transition.
pub struct BookingRepo;

impl BookingRepo {
    /// Insert a SCHEDULED booking.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreateBooking,
    ) -> Result<Booking, sqlx::Error> {
        let query = format!(
            "WITH b AS (
                INSERT INTO bookings
                    (user_id, mentor_id, subscription_id, status_id, scheduled_at, duration_mins, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
             )
             SELECT {COLUMNS} FROM b JOIN mentors m ON m.id = b.mentor_id"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(input.user_id)
            .bind(input.mentor_id)
            .bind(input.subscription_id)
            .bind(BookingStatus::Scheduled.id())
            .bind(input.scheduled_at)
            .bind(input.duration_mins)
            .bind(&input.notes)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings b JOIN mentors m ON m.id = b.mentor_id WHERE b.id = $1"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Bookings where the user is the subscriber, soonest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings b JOIN mentors m ON m.id = b.mentor_id
             WHERE b.user_id = $1
             ORDER BY b.scheduled_at, b.id"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Bookings assigned to the mentor profile owned by `mentor_user_id`.
    pub async fn list_for_mentor_user(
        pool: &PgPool,
        mentor_user_id: DbId,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings b JOIN mentors m ON m.id = b.mentor_id
             WHERE m.user_id = $1
             ORDER BY b.scheduled_at, b.id"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(mentor_user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings b JOIN mentors m ON m.id = b.mentor_id
             ORDER BY b.scheduled_at, b.id"
        );
        sqlx::query_as::<_, Booking>(&query).fetch_all(pool).await
    }

    /// Number of SCHEDULED bookings drawing on a subscription.
    pub async fn count_scheduled_for_subscription<'e, E: PgExecutor<'e>>(
        executor: E,
        subscription_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE subscription_id = $1 AND status_id = $2",
        )
        .bind(subscription_id)
        .bind(BookingStatus::Scheduled.id())
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Move a booking from `from` to `to` if it is still in `from`, stamping
    /// `completed_at` or `cancelled_at`.
    ///
    /// Returns `None` when the booking is missing or its status moved on.
    pub async fn transition(
        conn: &mut PgConnection,
        id: DbId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings b SET
                status_id = $3,
                completed_at = CASE WHEN $3 = $4 THEN NOW() ELSE b.completed_at END,
                cancelled_at = CASE WHEN $3 = $5 THEN NOW() ELSE b.cancelled_at END
             FROM mentors m
             WHERE b.id = $1 AND b.status_id = $2 AND m.id = b.mentor_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(BookingStatus::Completed.id())
            .bind(BookingStatus::Cancelled.id())
            .fetch_optional(conn)
            .await
    }
}
