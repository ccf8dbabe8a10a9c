//! Admin handlers for user account management.
//!
//! Every route requires [`Capability::ManageUsers`]. Changes that touch a
//! staff account additionally require [`Capability::ManageAdmins`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mentorhub_core::error::CoreError;
use mentorhub_core::roles::{validate_role_change, Capability, Role};
use mentorhub_core::types::DbId;
use mentorhub_db::models::user::{UpdateUser, User, UserResponse};
use mentorhub_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireUserManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Staff accounts may only be modified by a caller who manages admins.
fn ensure_may_modify(actor: &AuthUser, target: &User) -> AppResult<()> {
    if target.parsed_role()?.is_staff() && !actor.can(Capability::ManageAdmins) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only a super admin may modify staff accounts".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireUserManager(_admin): RequireUserManager,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireUserManager(_admin): RequireUserManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireUserManager(admin): RequireUserManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let current = find_user(&state, id).await?;
    ensure_may_modify(&admin, &current)?;

    if let Some(target) = input.role {
        if id == admin.user_id && target != admin.role {
            return Err(AppError::Core(CoreError::Conflict(
                "Cannot change your own role".into(),
            )));
        }
        validate_role_change(admin.role, current.parsed_role()?, target)?;
    }
    if input.is_active == Some(false) && id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot deactivate your own account".into(),
        )));
    }

    let update = UpdateUser {
        username: input.username,
        email: input.email,
        role: input.role,
        is_active: input.is_active,
    };
    let change = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(
        user_id = id,
        role = %change.user.role,
        revoked = change.revoked_sessions,
        admin_id = admin.user_id,
        "User updated"
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(&change.user),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivates the account and revokes its sessions.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireUserManager(admin): RequireUserManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot deactivate your own account".into(),
        )));
    }
    let current = find_user(&state, id).await?;
    ensure_may_modify(&admin, &current)?;

    let revoked = UserRepo::deactivate(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!("User {id} is already inactive")))
    })?;
    tracing::info!(user_id = id, revoked, admin_id = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
