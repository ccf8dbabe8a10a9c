//! Repository for the `subscriptions` table.
//!
//! `consumed_sessions` is only ever advanced through [`SubscriptionRepo::consume_session`],
//! a compare-and-set on the expected prior value.

use mentorhub_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::subscription::{CreateSubscription, Subscription};

const COLUMNS: &str = "id, user_id, package_id, billing_reference, starts_at, expires_at, \
                        total_sessions, consumed_sessions, created_at, updated_at";

/// Provides CRUD operations and the consumption CAS for subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert a subscription. Overlapping windows for the same user are
    /// rejected by `ex_subscriptions_user_window`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions
                (user_id, package_id, billing_reference, starts_at, expires_at, total_sessions)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(input.package_id)
            .bind(&input.billing_reference)
            .bind(input.starts_at)
            .bind(input.expires_at)
            .bind(input.total_sessions)
            .fetch_one(pool)
            .await
    }

    /// Find a subscription by ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All subscriptions of a user, most recent window first.
    pub async fn list_for_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: DbId,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY starts_at DESC, id DESC"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// All subscriptions of a user, locked `FOR UPDATE` until the caller's
    /// transaction ends. Rows are the latest committed versions.
    pub async fn lock_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1
             ORDER BY starts_at DESC, id DESC
             FOR UPDATE"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_all(conn)
            .await
    }

    /// Advance `consumed_sessions` by one if it still equals `expected_consumed`.
    ///
    /// Returns `None` when another writer got there first or the allotment is
    /// exhausted. The caller decides whether to re-read and retry.
    pub async fn consume_session(
        conn: &mut PgConnection,
        id: DbId,
        expected_consumed: i32,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET consumed_sessions = consumed_sessions + 1
             WHERE id = $1 AND consumed_sessions = $2 AND consumed_sessions < total_sessions
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .bind(expected_consumed)
            .fetch_optional(conn)
            .await
    }
}
