//! Route definitions for the billing ledger webhook.

use axum::routing::post;
use axum::Router;

use crate::handlers::billing;
use crate::state::AppState;

/// Routes mounted at `/billing`. Authenticated by payload signature, not JWT.
///
/// ```text
/// POST /subscriptions -> purchase_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/subscriptions", post(billing::purchase_webhook))
}
