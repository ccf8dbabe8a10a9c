//! Assessment tool and tool result models.

use mentorhub_core::assessment::ToolShape;
use mentorhub_core::packages::AccessLevel;
use mentorhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tools` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tool {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub question_count: i32,
    pub max_answer_value: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tool {
    pub fn shape(&self) -> ToolShape {
        ToolShape {
            question_count: self.question_count,
            max_answer_value: self.max_answer_value,
        }
    }
}

/// DTO for creating a tool.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTool {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub question_count: i32,
    pub max_answer_value: i32,
}

/// A row from the append-only `tool_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ToolResult {
    pub id: DbId,
    pub user_id: DbId,
    pub tool_id: DbId,
    pub access_level: String,
    pub responses: serde_json::Value,
    pub score: i32,
    pub created_at: Timestamp,
}

/// DTO for recording an attempt. `score` is always server-computed.
#[derive(Debug, Clone)]
pub struct CreateToolResult {
    pub user_id: DbId,
    pub tool_id: DbId,
    pub access_level: AccessLevel,
    pub responses: Vec<i32>,
    pub score: i32,
}
