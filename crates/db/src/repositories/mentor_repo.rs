//! Repository for the `mentors` table.

use mentorhub_core::status::BookingStatus;
use mentorhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::mentor::{CreateMentor, Mentor, MentorWithLoad, UpdateMentor};

const COLUMNS: &str =
    "id, user_id, display_name, bio, segments, accepting_bookings, created_at, updated_at";

/// Provides CRUD operations for mentor profiles.
pub struct MentorRepo;

impl MentorRepo {
    pub async fn create(pool: &PgPool, input: &CreateMentor) -> Result<Mentor, sqlx::Error> {
        let query = format!(
            "INSERT INTO mentors (user_id, display_name, bio, segments)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mentor>(&query)
            .bind(input.user_id)
            .bind(&input.display_name)
            .bind(&input.bio)
            .bind(&input.segments)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Mentor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentors WHERE id = $1");
        sqlx::query_as::<_, Mentor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Mentor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentors ORDER BY id");
        sqlx::query_as::<_, Mentor>(&query).fetch_all(pool).await
    }

    /// Update a mentor profile. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMentor,
    ) -> Result<Option<Mentor>, sqlx::Error> {
        let query = format!(
            "UPDATE mentors SET
                display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                segments = COALESCE($4, segments),
                accepting_bookings = COALESCE($5, accepting_bookings)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mentor>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.bio)
            .bind(&input.segments)
            .bind(input.accepting_bookings)
            .fetch_optional(pool)
            .await
    }

    /// Mentors serving `segment` whose user account is active, with their
    /// count of upcoming SCHEDULED bookings.
    pub async fn list_with_load(
        pool: &PgPool,
        segment: &str,
    ) -> Result<Vec<MentorWithLoad>, sqlx::Error> {
        sqlx::query_as::<_, MentorWithLoad>(
            "SELECT m.id, m.user_id, m.display_name, m.bio, m.segments, m.accepting_bookings,
                    COUNT(b.id) AS upcoming_bookings
             FROM mentors m
             JOIN users u ON u.id = m.user_id AND u.is_active = true
             LEFT JOIN bookings b
                ON b.mentor_id = m.id AND b.status_id = $2 AND b.scheduled_at > NOW()
             WHERE $1 = ANY(m.segments)
             GROUP BY m.id
             ORDER BY m.id",
        )
        .bind(segment)
        .bind(BookingStatus::Scheduled.id())
        .fetch_all(pool)
        .await
    }
}
