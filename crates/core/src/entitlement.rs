//! Entitlement resolution: tool access and session quota.
//!
//! Everything here is a pure function over subscription terms and tool
//! rules already read from storage. The API layer performs the reads and
//! the compare-and-set write; this module decides.

use serde::Serialize;

use crate::error::CoreError;
use crate::packages::AccessLevel;
use crate::types::{DbId, Timestamp};

/// The slice of a subscription the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTerms {
    pub id: DbId,
    pub package_id: DbId,
    pub starts_at: Timestamp,
    pub expires_at: Timestamp,
    pub total_sessions: i32,
    pub consumed_sessions: i32,
}

impl SubscriptionTerms {
    /// Validity window is half-open: `[starts_at, expires_at)`.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.starts_at <= now && now < self.expires_at
    }

    /// Sessions left on the allotment, never negative.
    pub fn remaining(&self) -> i32 {
        (self.total_sessions - self.consumed_sessions).max(0)
    }
}

/// Why an entitlement check denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoActivePackage,
    ToolNotIncluded,
    ToolLocked,
    SubscriptionNotStarted,
    SubscriptionExpired,
    SessionsExhausted,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::NoActivePackage => "no active package",
            DenyReason::ToolNotIncluded => "tool not included",
            DenyReason::ToolLocked => "tool locked",
            DenyReason::SubscriptionNotStarted => "subscription not started",
            DenyReason::SubscriptionExpired => "subscription expired",
            DenyReason::SessionsExhausted => "no sessions remaining",
        }
    }
}

impl Serialize for DenyReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of a tool access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolAccessDecision {
    pub allowed: bool,
    pub level: AccessLevel,
    /// Set for TEASER access: the tool may be used in preview mode only.
    pub reduced_capability: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl ToolAccessDecision {
    fn deny(level: AccessLevel, reason: DenyReason) -> Self {
        Self {
            allowed: false,
            level,
            reduced_capability: false,
            reason: Some(reason),
        }
    }
}

/// Outcome of a session availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionAvailability {
    pub allowed: bool,
    pub remaining: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl SessionAvailability {
    fn deny(subscription_id: Option<DbId>, reason: DenyReason) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            subscription_id,
            reason: Some(reason),
        }
    }
}

/// A compare-and-set plan for consuming one session unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumptionPlan {
    pub subscription_id: DbId,
    /// The counter value the conditional update must still observe.
    pub expected_consumed: i32,
}

// ---------------------------------------------------------------------------
// Subscription selection
// ---------------------------------------------------------------------------

/// Pick the single subscription active at `now`.
///
/// Storage guarantees at most one active subscription per user; seeing two
/// means that guarantee was broken, which is reported rather than resolved.
pub fn select_active(
    subscriptions: &[SubscriptionTerms],
    now: Timestamp,
) -> Result<Option<&SubscriptionTerms>, CoreError> {
    let mut active = subscriptions.iter().filter(|s| s.is_active_at(now));
    let first = active.next();
    if let Some(second) = active.next() {
        return Err(CoreError::Internal(format!(
            "Subscriptions {} and {} are both active",
            first.map(|s| s.id).unwrap_or_default(),
            second.id
        )));
    }
    Ok(first)
}

/// Pick the subscription availability should report on: the active one,
/// otherwise the most recently started one (so an expired subscription is
/// reported as expired rather than missing).
pub fn select_current(
    subscriptions: &[SubscriptionTerms],
    now: Timestamp,
) -> Result<Option<&SubscriptionTerms>, CoreError> {
    if let Some(active) = select_active(subscriptions, now)? {
        return Ok(Some(active));
    }
    Ok(subscriptions
        .iter()
        .filter(|s| s.starts_at <= now)
        .max_by_key(|s| (s.starts_at, s.id)))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Decide tool access.
///
/// `active` is the caller's active subscription; `rule` is the access level
/// the subscription's package grants for the tool, if any rule exists.
/// Order: no subscription, then no rule, then the level itself.
pub fn resolve_tool_access(
    active: Option<&SubscriptionTerms>,
    rule: Option<AccessLevel>,
) -> ToolAccessDecision {
    if active.is_none() {
        return ToolAccessDecision::deny(AccessLevel::Locked, DenyReason::NoActivePackage);
    }
    match rule {
        None => ToolAccessDecision::deny(AccessLevel::Locked, DenyReason::ToolNotIncluded),
        Some(AccessLevel::Locked) => {
            ToolAccessDecision::deny(AccessLevel::Locked, DenyReason::ToolLocked)
        }
        Some(AccessLevel::Teaser) => ToolAccessDecision {
            allowed: true,
            level: AccessLevel::Teaser,
            reduced_capability: true,
            reason: None,
        },
        Some(AccessLevel::Full) => ToolAccessDecision {
            allowed: true,
            level: AccessLevel::Full,
            reduced_capability: false,
            reason: None,
        },
    }
}

/// Availability of one subscription. Expiry is checked before the count.
pub fn availability_for(subscription: &SubscriptionTerms, now: Timestamp) -> SessionAvailability {
    let id = Some(subscription.id);
    if now < subscription.starts_at {
        return SessionAvailability::deny(id, DenyReason::SubscriptionNotStarted);
    }
    if now >= subscription.expires_at {
        return SessionAvailability::deny(id, DenyReason::SubscriptionExpired);
    }
    let remaining = subscription.remaining();
    if remaining <= 0 {
        return SessionAvailability::deny(id, DenyReason::SessionsExhausted);
    }
    SessionAvailability {
        allowed: true,
        remaining,
        subscription_id: id,
        reason: None,
    }
}

/// Availability across all of a user's subscriptions.
pub fn check_session_availability(
    subscriptions: &[SubscriptionTerms],
    now: Timestamp,
) -> Result<SessionAvailability, CoreError> {
    Ok(match select_current(subscriptions, now)? {
        Some(current) => availability_for(current, now),
        None => SessionAvailability::deny(None, DenyReason::NoActivePackage),
    })
}

/// Plan consumption of one session from `subscription`.
///
/// An expired or exhausted subscription is a state conflict at this point:
/// the booking was admitted earlier and the terms have since run out.
pub fn plan_consumption(
    subscription: &SubscriptionTerms,
    now: Timestamp,
) -> Result<ConsumptionPlan, CoreError> {
    let availability = availability_for(subscription, now);
    if let Some(reason) = availability.reason {
        return Err(CoreError::Conflict(format!(
            "Cannot consume a session from subscription {}: {}",
            subscription.id,
            reason.as_str()
        )));
    }
    Ok(ConsumptionPlan {
        subscription_id: subscription.id,
        expected_consumed: subscription.consumed_sessions,
    })
}
