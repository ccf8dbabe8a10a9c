//! Handlers for assessment tools, tool access and tool results.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mentorhub_core::assessment::{
    client_score_diverges, compute_score, validate_responses, validate_tool_definition, ToolShape,
};
use mentorhub_core::entitlement::ToolAccessDecision;
use mentorhub_core::error::CoreError;
use mentorhub_core::types::DbId;
use mentorhub_db::models::tool::{CreateTool, CreateToolResult, Tool, ToolResult};
use mentorhub_db::repositories::{ToolRepo, ToolResultRepo};
use serde::Deserialize;
use validator::Validate;

use crate::entitlements::check_tool_access;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCatalogManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /tools/{id}/results`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResultRequest {
    #[validate(length(min = 1))]
    pub responses: Vec<i32>,
    /// Score the client computed. Compared and logged, never stored.
    pub client_score: Option<i32>,
}

async fn find_tool(state: &AppState, id: DbId) -> AppResult<Tool> {
    ToolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Tool", id }))
}

/// GET /api/v1/tools
pub async fn list_tools(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Tool>>>> {
    let tools = ToolRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: tools }))
}

/// GET /api/v1/tools/{id}
pub async fn get_tool(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Tool>>> {
    let tool = find_tool(&state, id).await?;
    Ok(Json(DataResponse { data: tool }))
}

/// POST /api/v1/admin/tools
pub async fn create_tool(
    State(state): State<AppState>,
    RequireCatalogManager(admin): RequireCatalogManager,
    Json(input): Json<CreateTool>,
) -> AppResult<(StatusCode, Json<DataResponse<Tool>>)> {
    let shape = ToolShape {
        question_count: input.question_count,
        max_answer_value: input.max_answer_value,
    };
    validate_tool_definition(&input.slug, &input.name, shape)?;

    let tool = ToolRepo::create(&state.pool, &input).await?;
    tracing::info!(tool_id = tool.id, slug = %tool.slug, admin_id = admin.user_id, "Tool created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: tool })))
}

/// GET /api/v1/tools/{id}/access
///
/// The caller's access decision for one tool. Always 200 for a known tool;
/// a denial is reported in the body.
pub async fn get_access(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ToolAccessDecision>>> {
    let decision = check_tool_access(&state.pool, user.user_id, id).await?;
    Ok(Json(DataResponse { data: decision }))
}

/// POST /api/v1/tools/{id}/results
///
/// Record an attempt. The score is recomputed from the responses.
pub async fn submit_result(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitResultRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ToolResult>>)> {
    input.validate()?;
    let tool = find_tool(&state, id).await?;

    let decision = check_tool_access(&state.pool, user.user_id, id).await?;
    if !decision.allowed {
        let reason = decision.reason.map(|r| r.as_str()).unwrap_or("access denied");
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot use tool {id}: {reason}"
        ))));
    }

    let shape = tool.shape();
    validate_responses(shape, decision.level, &input.responses)?;
    let score = compute_score(shape, &input.responses);

    if client_score_diverges(score, input.client_score) {
        tracing::warn!(
            user_id = user.user_id,
            tool_id = id,
            server_score = score,
            client_score = ?input.client_score,
            "Client-reported score ignored"
        );
    }

    let result = ToolResultRepo::create(
        &state.pool,
        &CreateToolResult {
            user_id: user.user_id,
            tool_id: id,
            access_level: decision.level,
            responses: input.responses,
            score,
        },
    )
    .await?;
    tracing::info!(user_id = user.user_id, tool_id = id, score, "Tool result recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/tools/{id}/results
///
/// The caller's attempts at one tool, newest first.
pub async fn list_results(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ToolResult>>>> {
    find_tool(&state, id).await?;
    let results = ToolResultRepo::list_for_user_tool(&state.pool, user.user_id, id).await?;
    Ok(Json(DataResponse { data: results }))
}
