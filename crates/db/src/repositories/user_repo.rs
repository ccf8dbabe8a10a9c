//! Repository for the `users` table.
//!
//! Account changes that invalidate access claims (a role change, a
//! deactivation) revoke the user's refresh tokens in the same transaction.

use mentorhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, FailedLogin, UpdateUser, User, UserChange};
use crate::repositories::SessionRepo;

const COLUMNS: &str = "id, username, email, password_hash, role, segment, onboarding_complete, \
                        is_active, last_login_at, failed_login_count, locked_until, \
                        created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Register an account. Onboarding starts incomplete.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Login lookup. Usernames are case-sensitive.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Every account, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Apply an admin edit. Only non-`None` fields are written.
    ///
    /// The row is locked while the edit is applied. If the role actually
    /// changes or the account goes from active to inactive, the user's
    /// refresh tokens are revoked before commit. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<UserChange>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prior: Option<(String, bool)> =
            sqlx::query_as("SELECT role, is_active FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((prior_role, was_active)) = prior else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(input.role.map(|r| r.as_str()))
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;

        let claims_stale = user.role != prior_role || (was_active && !user.is_active);
        let revoked_sessions = if claims_stale {
            SessionRepo::revoke_all_for_user(&mut *tx, id).await?
        } else {
            0
        };

        tx.commit().await?;
        Ok(Some(UserChange {
            user,
            revoked_sessions,
        }))
    }

    /// Soft-deactivate an active account and revoke its refresh tokens.
    ///
    /// Returns the number of revoked tokens, or `None` if the account does
    /// not exist or is already inactive.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let revoked = SessionRepo::revoke_all_for_user(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(Some(revoked))
    }

    /// Record the professional segment and mark onboarding complete.
    pub async fn complete_onboarding(
        pool: &PgPool,
        id: DbId,
        segment: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET segment = $2, onboarding_complete = true
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(segment)
            .fetch_optional(pool)
            .await
    }

    /// Count a failed password attempt.
    ///
    /// When the count reaches `max_attempts` the account is locked for
    /// `lock_mins` from now, in the same statement, so concurrent failures
    /// cannot slip past the threshold.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_mins: i32,
    ) -> Result<FailedLogin, sqlx::Error> {
        sqlx::query_as::<_, FailedLogin>(
            "UPDATE users SET
                failed_login_count = failed_login_count + 1,
                locked_until = CASE
                    WHEN failed_login_count + 1 >= $2 THEN NOW() + make_interval(mins => $3)
                    ELSE locked_until
                END
             WHERE id = $1
             RETURNING failed_login_count, locked_until",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_mins)
        .fetch_one(pool)
        .await
    }

    /// Reset the lockout counters and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
