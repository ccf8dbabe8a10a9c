//! Package catalog rules: tiers, tool access levels, and the publication
//! lifecycle.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::PackageStatus;
use crate::types::DbId;

/// Maximum length of a package product name.
pub const MAX_PACKAGE_NAME_LEN: usize = 200;

/// Upper bound on the session allotment of a single package.
pub const MAX_TOTAL_SESSIONS: i32 = 500;

/// Upper bound on a package validity window, in days.
pub const MAX_VALIDITY_DAYS: i32 = 730;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Package tier. Ordered from narrowest to broadest feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Basic,
    Pro,
    Premium,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Basic => "BASIC",
            Tier::Pro => "PRO",
            Tier::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BASIC" => Ok(Tier::Basic),
            "PRO" => Ok(Tier::Pro),
            "PREMIUM" => Ok(Tier::Premium),
            other => Err(CoreError::Invalid(format!(
                "Unknown tier '{other}'. Must be one of: BASIC, PRO, PREMIUM"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Access level
// ---------------------------------------------------------------------------

/// Per-tool visibility granted by a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    Locked,
    Teaser,
    Full,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Locked => "LOCKED",
            AccessLevel::Teaser => "TEASER",
            AccessLevel::Full => "FULL",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCKED" => Ok(AccessLevel::Locked),
            "TEASER" => Ok(AccessLevel::Teaser),
            "FULL" => Ok(AccessLevel::Full),
            other => Err(CoreError::Invalid(format!(
                "Unknown access level '{other}'. Must be one of: LOCKED, TEASER, FULL"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the purchasable terms of a package.
pub fn validate_package_terms(
    name: &str,
    total_sessions: i32,
    validity_days: i32,
) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Invalid("Package name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_PACKAGE_NAME_LEN {
        return Err(CoreError::Invalid(format!(
            "Package name must be at most {MAX_PACKAGE_NAME_LEN} characters"
        )));
    }
    if !(0..=MAX_TOTAL_SESSIONS).contains(&total_sessions) {
        return Err(CoreError::Invalid(format!(
            "total_sessions must be between 0 and {MAX_TOTAL_SESSIONS}, got {total_sessions}"
        )));
    }
    if !(1..=MAX_VALIDITY_DAYS).contains(&validity_days) {
        return Err(CoreError::Invalid(format!(
            "validity_days must be between 1 and {MAX_VALIDITY_DAYS}, got {validity_days}"
        )));
    }
    Ok(())
}

/// Validate a full replacement set of tool rules for one package.
///
/// Exactly one rule per (package, tool): a tool id may appear only once.
pub fn validate_tool_rules(rules: &[(DbId, AccessLevel)]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(rules.len());
    for (tool_id, _) in rules {
        if !seen.insert(*tool_id) {
            return Err(CoreError::Invalid(format!(
                "Tool {tool_id} appears more than once; each tool takes exactly one rule"
            )));
        }
    }
    Ok(())
}

/// Validate a publication state change.
///
/// DRAFT -> PUBLISHED is one-way. PUBLISHED and UNPUBLISHED toggle between
/// each other. Nothing returns to DRAFT, and a no-op change is a conflict.
pub fn validate_status_transition(
    from: PackageStatus,
    to: PackageStatus,
) -> Result<(), CoreError> {
    use PackageStatus::*;
    match (from, to) {
        (Draft, Published) | (Published, Unpublished) | (Unpublished, Published) => Ok(()),
        _ => Err(CoreError::Conflict(format!(
            "Package cannot move from {from} to {to}"
        ))),
    }
}

/// Tool rules and session allotment may only change while a package is DRAFT.
pub fn ensure_terms_editable(status: PackageStatus) -> Result<(), CoreError> {
    if status == PackageStatus::Draft {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Package is {status}; its terms are frozen once published"
        )))
    }
}
