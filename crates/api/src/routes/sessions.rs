//! Route definitions for the `/sessions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// `{id}` is a user id for availability and a booking id for the
/// transitions.
///
/// ```text
/// GET  /{id}/availability -> get_availability
/// POST /{id}/complete     -> complete
/// POST /{id}/cancel       -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/availability", get(sessions::get_availability))
        .route("/{id}/complete", post(sessions::complete))
        .route("/{id}/cancel", post(sessions::cancel))
}
