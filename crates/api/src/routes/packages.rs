//! Route definitions for the public `/packages` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::packages;
use crate::state::AppState;

/// Routes mounted at `/packages`.
///
/// ```text
/// GET /      -> list_published (?segment=)
/// GET /{id}  -> get_published
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(packages::list_published))
        .route("/{id}", get(packages::get_published))
}
