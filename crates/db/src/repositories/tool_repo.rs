//! Repository for the `tools` table.

use mentorhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::tool::{CreateTool, Tool};

const COLUMNS: &str =
    "id, slug, name, description, question_count, max_answer_value, created_at, updated_at";

/// Provides CRUD operations for assessment tools.
pub struct ToolRepo;

impl ToolRepo {
    /// Insert a new tool, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTool) -> Result<Tool, sqlx::Error> {
        let query = format!(
            "INSERT INTO tools (slug, name, description, question_count, max_answer_value)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tool>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.question_count)
            .bind(input.max_answer_value)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tool>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tools WHERE id = $1");
        sqlx::query_as::<_, Tool>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Tool>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tools ORDER BY name, id");
        sqlx::query_as::<_, Tool>(&query).fetch_all(pool).await
    }
}
