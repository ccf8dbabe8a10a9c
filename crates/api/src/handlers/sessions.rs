//! Handlers for the `/sessions` resource: quota checks and booking
//! completion / cancellation.

use axum::extract::{Path, State};
use axum::Json;
use mentorhub_core::booking::ensure_participant;
use mentorhub_core::entitlement::SessionAvailability;
use mentorhub_core::roles::Capability;
use mentorhub_core::types::DbId;
use mentorhub_db::models::booking::Booking;

use crate::entitlements::{self, CompletedSession};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sessions/{id}/availability
///
/// `id` is a user id. Callers may query themselves; staff may query anyone.
pub async fn get_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SessionAvailability>>> {
    user.ensure_self_or(id, Capability::ViewAllBookings)?;
    let availability = entitlements::check_session_availability(&state.pool, id).await?;
    Ok(Json(DataResponse { data: availability }))
}

/// POST /api/v1/sessions/{id}/complete
///
/// `id` is a booking id. Completes the booking and consumes one session.
pub async fn complete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CompletedSession>>> {
    let completed = entitlements::complete_booking(&state.pool, id, |booking| {
        ensure_participant(user.user_id, booking.user_id, booking.mentor_user_id)
    })
    .await?;
    Ok(Json(DataResponse { data: completed }))
}

/// POST /api/v1/sessions/{id}/cancel
///
/// `id` is a booking id. Cancels without consuming.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Booking>>> {
    let booking = entitlements::cancel_booking(&state.pool, id, |booking| {
        ensure_participant(user.user_id, booking.user_id, booking.mentor_user_id)
    })
    .await?;
    Ok(Json(DataResponse { data: booking }))
}
