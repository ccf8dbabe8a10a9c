//! Route definitions for the `/tools` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tools;
use crate::state::AppState;

/// Routes mounted at `/tools`.
///
/// ```text
/// GET  /              -> list_tools
/// GET  /{id}          -> get_tool
/// GET  /{id}/access   -> get_access
/// GET  /{id}/results  -> list_results
/// POST /{id}/results  -> submit_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tools::list_tools))
        .route("/{id}", get(tools::get_tool))
        .route("/{id}/access", get(tools::get_access))
        .route(
            "/{id}/results",
            get(tools::list_results).post(tools::submit_result),
        )
}
