//! Subscription model: a user's purchased package and its session counter.

use mentorhub_core::entitlement::SubscriptionTerms;
use mentorhub_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub package_id: DbId,
    pub billing_reference: String,
    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
    pub total_sessions: i32,
    pub consumed_sessions: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// The view of this row the entitlement resolver works on.
    pub fn terms(&self) -> SubscriptionTerms {
        SubscriptionTerms {
            id: self.id,
            package_id: self.package_id,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            total_sessions: self.total_sessions,
            consumed_sessions: self.consumed_sessions,
        }
    }
}

/// DTO for creating a subscription from a billing notification.
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub user_id: DbId,
    pub package_id: DbId,
    pub billing_reference: String,
    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
    pub total_sessions: i32,
}
