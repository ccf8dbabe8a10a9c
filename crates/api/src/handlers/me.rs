//! Handlers for the caller's own profile, onboarding and subscriptions.

use axum::extract::State;
use axum::Json;
use mentorhub_core::error::CoreError;
use mentorhub_core::onboarding::validate_segment;
use mentorhub_db::models::subscription::Subscription;
use mentorhub_db::models::user::UserResponse;
use mentorhub_db::repositories::{SubscriptionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::{issue_tokens, AuthResponse};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /me/onboarding`.
#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub segment: String,
}

/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&row),
    }))
}

/// PUT /api/v1/me/onboarding
///
/// Record the caller's segment and complete onboarding. Returns a fresh
/// token pair so the claims carry the new flag. Re-submitting updates the
/// segment.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<OnboardingRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_segment(&input.segment)?;

    let row = UserRepo::complete_onboarding(&state.pool, user.user_id, &input.segment)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    tracing::info!(user_id = row.id, segment = %input.segment, "Onboarding completed");

    Ok(Json(issue_tokens(&state, &row).await?))
}

/// GET /api/v1/me/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Subscription>>>> {
    let subscriptions = SubscriptionRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: subscriptions,
    }))
}
