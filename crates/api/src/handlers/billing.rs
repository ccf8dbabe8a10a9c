//! Billing ledger webhook.
//!
//! The ledger notifies us of completed purchases. Each delivery is signed
//! with the shared webhook secret; the subscription copies the package's
//! session allotment at purchase time.
//!
//! A purchase names either a `package_id` or a `(segment, tier)` pair, which
//! is matched against the package currently on sale for that pair.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Duration;
use mentorhub_core::billing::{validate_billing_reference, verify_signature, SIGNATURE_HEADER};
use mentorhub_core::error::CoreError;
use mentorhub_core::packages::Tier;
use mentorhub_core::status::PackageStatus;
use mentorhub_core::types::{DbId, Timestamp};
use mentorhub_db::models::package::Package;
use mentorhub_db::models::subscription::{CreateSubscription, Subscription};
use mentorhub_db::repositories::{PackageRepo, SubscriptionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a purchase notification.
#[derive(Debug, Deserialize)]
pub struct PurchaseEvent {
    pub user_id: DbId,
    pub package_id: Option<DbId>,
    pub segment: Option<String>,
    pub tier: Option<Tier>,
    pub billing_reference: String,
    /// Defaults to the time of receipt.
    pub starts_at: Option<Timestamp>,
}

/// Resolve the purchased package. Only a PUBLISHED package can be sold.
async fn purchased_package(state: &AppState, event: &PurchaseEvent) -> AppResult<Package> {
    match (event.package_id, event.segment.as_deref(), event.tier) {
        (Some(id), None, None) => {
            let package = PackageRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound { entity: "Package", id }))?;
            if package.status()? != PackageStatus::Published {
                return Err(AppError::Core(CoreError::Conflict(format!(
                    "Package {id} is not on sale"
                ))));
            }
            Ok(package)
        }
        (None, Some(segment), Some(tier)) => {
            PackageRepo::find_published_by_segment_tier(&state.pool, segment, tier)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict(format!(
                        "No {tier} package is on sale for segment '{segment}'"
                    )))
                })
        }
        _ => Err(AppError::Core(CoreError::Invalid(
            "A purchase names either package_id or both segment and tier".into(),
        ))),
    }
}

/// POST /api/v1/billing/subscriptions
pub async fn purchase_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<Subscription>>)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthenticated(format!(
                "Missing {SIGNATURE_HEADER} header"
            )))
        })?;
    verify_signature(&state.config.billing_webhook_secret, &body, signature).inspect_err(|_| {
        tracing::warn!("Rejected billing webhook with bad signature");
    })?;

    let event: PurchaseEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed purchase event: {e}")))?;
    validate_billing_reference(&event.billing_reference)?;

    UserRepo::find_by_id(&state.pool, event.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: event.user_id,
        }))?;
    let package = purchased_package(&state, &event).await?;

    let starts_at = event.starts_at.unwrap_or_else(chrono::Utc::now);
    let input = CreateSubscription {
        user_id: event.user_id,
        package_id: package.id,
        billing_reference: event.billing_reference,
        starts_at,
        expires_at: starts_at + Duration::days(i64::from(package.validity_days)),
        total_sessions: package.total_sessions,
    };
    let subscription = SubscriptionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        subscription_id = subscription.id,
        user_id = subscription.user_id,
        package_id = subscription.package_id,
        billing_reference = %subscription.billing_reference,
        "Subscription created from purchase"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: subscription })))
}
