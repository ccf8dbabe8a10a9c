//! Repository for refresh-token sessions (`user_sessions`).
//!
//! Tokens are stored by hash only. A token is live while it is unrevoked,
//! unexpired and owned by an active user.

use mentorhub_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Store a newly issued refresh token.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Spend a live refresh token and store its successor.
    ///
    /// One statement: the presented row is revoked and the successor is
    /// inserted for the same user. Concurrent rotations of one token block on
    /// the row lock and only the first finds it unrevoked, so at most one
    /// successor is ever minted. Returns `None` when the presented token is
    /// unknown, spent, expired, or its owner is deactivated.
    pub async fn rotate(
        pool: &PgPool,
        presented_hash: &str,
        successor_hash: &str,
        successor_expires_at: Timestamp,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "WITH spent AS (
                UPDATE user_sessions s SET is_revoked = true
                FROM users u
                WHERE s.refresh_token_hash = $1
                  AND s.is_revoked = false
                  AND s.expires_at > NOW()
                  AND u.id = s.user_id
                  AND u.is_active = true
                RETURNING s.user_id
             )
             INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             SELECT user_id, $2, $3 FROM spent
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(presented_hash)
            .bind(successor_hash)
            .bind(successor_expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live token of a user, returning how many were revoked.
    ///
    /// Takes any executor so account changes can revoke inside their own
    /// transaction.
    pub async fn revoke_all_for_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
