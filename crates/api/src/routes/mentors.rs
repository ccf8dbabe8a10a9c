//! Route definitions for the `/mentors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::mentors;
use crate::state::AppState;

/// Routes mounted at `/mentors`.
///
/// ```text
/// GET /          -> list_mentors
/// GET /matches   -> list_matches
/// GET /{id}      -> get_mentor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(mentors::list_mentors))
        .route("/matches", get(mentors::list_matches))
        .route("/{id}", get(mentors::get_mentor))
}
