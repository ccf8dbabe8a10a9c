//! Package catalog models: packages and their tool access rules.

use mentorhub_core::error::CoreError;
use mentorhub_core::packages::{AccessLevel, Tier};
use mentorhub_core::status::{PackageStatus, StatusId};
use mentorhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Package {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub tier: String,
    pub segment: String,
    pub total_sessions: i32,
    pub validity_days: i32,
    pub status_id: StatusId,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Package {
    pub fn status(&self) -> Result<PackageStatus, CoreError> {
        PackageStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Package {} has unknown status_id {}",
                self.id, self.status_id
            ))
        })
    }

    pub fn parsed_tier(&self) -> Result<Tier, CoreError> {
        self.tier.parse()
    }
}

/// DTO for creating a new (DRAFT) package.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePackage {
    pub name: String,
    pub description: Option<String>,
    pub tier: Tier,
    pub segment: String,
    pub total_sessions: i32,
    pub validity_days: i32,
}

/// DTO for updating a package. Allotment and validity are DRAFT-only;
/// the caller enforces that before writing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePackage {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_sessions: Option<i32>,
    pub validity_days: Option<i32>,
}

impl UpdatePackage {
    /// Whether this update touches purchasable terms.
    pub fn changes_terms(&self) -> bool {
        self.total_sessions.is_some() || self.validity_days.is_some()
    }
}

/// A row from the `tool_access_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ToolAccessRule {
    pub id: DbId,
    pub package_id: DbId,
    pub tool_id: DbId,
    pub access_level: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ToolAccessRule {
    pub fn level(&self) -> Result<AccessLevel, CoreError> {
        self.access_level.parse()
    }
}

/// One entry of a rule replacement request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToolRuleInput {
    pub tool_id: DbId,
    pub access_level: AccessLevel,
}
