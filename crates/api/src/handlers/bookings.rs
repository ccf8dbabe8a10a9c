//! Handlers for the `/bookings` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mentorhub_core::booking::{ensure_can_view, validate_slot, DEFAULT_DURATION_MINS};
use mentorhub_core::error::CoreError;
use mentorhub_core::onboarding::ensure_onboarded;
use mentorhub_core::roles::Capability;
use mentorhub_core::types::{DbId, Timestamp};
use mentorhub_db::models::booking::Booking;
use mentorhub_db::repositories::{BookingRepo, MentorRepo};
use serde::Deserialize;
use validator::Validate;

use crate::entitlements::{schedule_booking, BookingRequest};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub mentor_id: DbId,
    pub scheduled_at: Timestamp,
    pub duration_mins: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query parameters for `GET /bookings`.
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    /// `subscriber` (default), `mentor`, or `all` (staff only).
    pub view: Option<String>,
}

/// POST /api/v1/bookings
///
/// Schedule a session with a mentor. Nothing is consumed until completion,
/// but outstanding bookings may not exceed the remaining allotment.
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Booking>>)> {
    input.validate()?;
    ensure_onboarded(user.onboarding_complete)?;

    let duration_mins = input.duration_mins.unwrap_or(DEFAULT_DURATION_MINS);
    validate_slot(input.scheduled_at, duration_mins, Utc::now())?;

    let mentor = MentorRepo::find_by_id(&state.pool, input.mentor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Mentor",
            id: input.mentor_id,
        }))?;
    if mentor.user_id == user.user_id {
        return Err(AppError::Core(CoreError::Invalid(
            "Mentors cannot book sessions with themselves".into(),
        )));
    }
    if !mentor.accepting_bookings {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Mentor {} is not accepting bookings",
            mentor.id
        ))));
    }

    let booking = schedule_booking(
        &state.pool,
        BookingRequest {
            user_id: user.user_id,
            mentor_id: mentor.id,
            scheduled_at: input.scheduled_at,
            duration_mins,
            notes: input.notes,
        },
    )
    .await?;
    tracing::info!(
        booking_id = booking.id,
        user_id = user.user_id,
        mentor_id = mentor.id,
        subscription_id = booking.subscription_id,
        "Booking scheduled"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// GET /api/v1/bookings?view=subscriber|mentor|all
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<BookingListParams>,
) -> AppResult<Json<DataResponse<Vec<Booking>>>> {
    let bookings = match params.view.as_deref().unwrap_or("subscriber") {
        "subscriber" => BookingRepo::list_for_user(&state.pool, user.user_id).await?,
        "mentor" => BookingRepo::list_for_mentor_user(&state.pool, user.user_id).await?,
        "all" => {
            if !user.can(Capability::ViewAllBookings) {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Viewing all bookings requires staff permission".into(),
                )));
            }
            BookingRepo::list_all(&state.pool).await?
        }
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown view '{other}'. Must be one of: subscriber, mentor, all"
            )))
        }
    };
    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Booking>>> {
    let booking = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id,
        }))?;
    ensure_can_view(user.user_id, user.role, booking.user_id, booking.mentor_user_id)?;
    Ok(Json(DataResponse { data: booking }))
}
