//! Route definitions for the `/me` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET /               -> get_profile
/// PUT /onboarding     -> complete_onboarding
/// GET /subscriptions  -> list_subscriptions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::get_profile))
        .route("/onboarding", put(me::complete_onboarding))
        .route("/subscriptions", get(me::list_subscriptions))
}
