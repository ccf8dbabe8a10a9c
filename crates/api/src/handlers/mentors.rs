//! Handlers for the mentor directory and matching.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mentorhub_core::error::CoreError;
use mentorhub_core::matching::rank_mentors;
use mentorhub_core::onboarding::{ensure_onboarded, validate_segments};
use mentorhub_core::types::DbId;
use mentorhub_db::models::mentor::{CreateMentor, Mentor, MentorWithLoad, UpdateMentor};
use mentorhub_db::repositories::{MentorRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireMentorManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/mentors
pub async fn list_mentors(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Mentor>>>> {
    let mentors = MentorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: mentors }))
}

/// GET /api/v1/mentors/{id}
pub async fn get_mentor(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Mentor>>> {
    let mentor = MentorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Mentor", id }))?;
    Ok(Json(DataResponse { data: mentor }))
}

/// GET /api/v1/mentors/matches
///
/// Accepting mentors serving the caller's segment, least loaded first.
pub async fn list_matches(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<MentorWithLoad>>>> {
    ensure_onboarded(user.onboarding_complete)?;

    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    let segment = row.segment.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "Complete onboarding before using this feature".into(),
        ))
    })?;

    let mut by_id: HashMap<DbId, MentorWithLoad> = MentorRepo::list_with_load(&state.pool, &segment)
        .await?
        .into_iter()
        .filter(|m| m.user_id != user.user_id)
        .map(|m| (m.id, m))
        .collect();

    let candidates = by_id.values().map(MentorWithLoad::candidate).collect();
    let ranked = rank_mentors(candidates, &segment)
        .into_iter()
        .filter_map(|c| by_id.remove(&c.mentor_id))
        .collect();

    Ok(Json(DataResponse { data: ranked }))
}

/// POST /api/v1/admin/mentors
pub async fn create_mentor(
    State(state): State<AppState>,
    RequireMentorManager(admin): RequireMentorManager,
    Json(input): Json<CreateMentor>,
) -> AppResult<(StatusCode, Json<DataResponse<Mentor>>)> {
    validate_segments(&input.segments)?;
    if input.display_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Invalid(
            "display_name must not be empty".into(),
        )));
    }
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let mentor = MentorRepo::create(&state.pool, &input).await?;
    tracing::info!(mentor_id = mentor.id, user_id = mentor.user_id, admin_id = admin.user_id, "Mentor created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: mentor })))
}

/// PUT /api/v1/admin/mentors/{id}
pub async fn update_mentor(
    State(state): State<AppState>,
    RequireMentorManager(admin): RequireMentorManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMentor>,
) -> AppResult<Json<DataResponse<Mentor>>> {
    if let Some(segments) = &input.segments {
        validate_segments(segments)?;
    }

    let mentor = MentorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Mentor", id }))?;
    tracing::info!(mentor_id = id, admin_id = admin.user_id, "Mentor updated");
    Ok(Json(DataResponse { data: mentor }))
}
