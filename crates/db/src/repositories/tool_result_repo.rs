//! Repository for the append-only `tool_results` table.

use mentorhub_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::tool::{CreateToolResult, ToolResult};

const COLUMNS: &str = "id, user_id, tool_id, access_level, responses, score, created_at";

/// Insert and read assessment attempts. There is no update or delete.
pub struct ToolResultRepo;

impl ToolResultRepo {
    /// Record one attempt.
    pub async fn create(
        pool: &PgPool,
        input: &CreateToolResult,
    ) -> Result<ToolResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO tool_results (user_id, tool_id, access_level, responses, score)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ToolResult>(&query)
            .bind(input.user_id)
            .bind(input.tool_id)
            .bind(input.access_level.as_str())
            .bind(Json(&input.responses))
            .bind(input.score)
            .fetch_one(pool)
            .await
    }

    /// A user's attempts at one tool, newest first.
    pub async fn list_for_user_tool(
        pool: &PgPool,
        user_id: DbId,
        tool_id: DbId,
    ) -> Result<Vec<ToolResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tool_results
             WHERE user_id = $1 AND tool_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ToolResult>(&query)
            .bind(user_id)
            .bind(tool_id)
            .fetch_all(pool)
            .await
    }
}
