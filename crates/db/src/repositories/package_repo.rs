//! Repository for the `packages` and `tool_access_rules` tables.

use mentorhub_core::packages::Tier;
use mentorhub_core::status::{PackageStatus, StatusId};
use mentorhub_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::package::{CreatePackage, Package, ToolAccessRule, ToolRuleInput, UpdatePackage};

/// Column list for `packages` queries.
const COLUMNS: &str = "id, name, description, tier, segment, total_sessions, validity_days, \
                        status_id, published_at, created_at, updated_at";

/// Column list for `tool_access_rules` queries.
const RULE_COLUMNS: &str = "id, package_id, tool_id, access_level, created_at, updated_at";

/// Provides CRUD operations for the package catalog.
pub struct PackageRepo;

impl PackageRepo {
    /// Insert a new package in DRAFT status.
    pub async fn create(pool: &PgPool, input: &CreatePackage) -> Result<Package, sqlx::Error> {
        let query = format!(
            "INSERT INTO packages (name, description, tier, segment, total_sessions, validity_days, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.tier.as_str())
            .bind(&input.segment)
            .bind(input.total_sessions)
            .bind(input.validity_days)
            .bind(PackageStatus::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// Find a package by ID regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Package>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packages WHERE id = $1");
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every package, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Package>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packages ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Package>(&query).fetch_all(pool).await
    }

    /// List PUBLISHED packages ordered by segment then id.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Package>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packages WHERE status_id = $1 ORDER BY segment, id"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(PackageStatus::Published.id())
            .fetch_all(pool)
            .await
    }

    /// Find the PUBLISHED package for a (segment, tier) pair.
    pub async fn find_published_by_segment_tier(
        pool: &PgPool,
        segment: &str,
        tier: Tier,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM packages WHERE segment = $1 AND tier = $2 AND status_id = $3"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(segment)
            .bind(tier.as_str())
            .bind(PackageStatus::Published.id())
            .fetch_optional(pool)
            .await
    }

    /// Update a package. Only non-`None` fields in `input` are applied.
    ///
    /// Session allotment and validity are only written while the row is
    /// still DRAFT, checked in the same statement. Returns `None` if no row
    /// with the given `id` exists or the terms are no longer editable.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePackage,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!(
            "UPDATE packages SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                total_sessions = COALESCE($4, total_sessions),
                validity_days = COALESCE($5, validity_days)
             WHERE id = $1
               AND (status_id = $6 OR ($4::INTEGER IS NULL AND $5::INTEGER IS NULL))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.total_sessions)
            .bind(input.validity_days)
            .bind(PackageStatus::Draft.id())
            .fetch_optional(pool)
            .await
    }

    /// Move a package from `from` to `to`, conditional on its current status.
    ///
    /// Returns `None` if the package is missing or no longer in `from`.
    /// `published_at` records the first publication only.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        from: PackageStatus,
        to: PackageStatus,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!(
            "UPDATE packages SET
                status_id = $3,
                published_at = CASE WHEN $3 = $4 THEN COALESCE(published_at, NOW())
                                    ELSE published_at END
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(PackageStatus::Published.id())
            .fetch_optional(pool)
            .await
    }

    // -- Tool access rules --------------------------------------------------

    /// List the rules for a package ordered by tool id.
    pub async fn list_rules(
        pool: &PgPool,
        package_id: DbId,
    ) -> Result<Vec<ToolAccessRule>, sqlx::Error> {
        let query = format!(
            "SELECT {RULE_COLUMNS} FROM tool_access_rules WHERE package_id = $1 ORDER BY tool_id"
        );
        sqlx::query_as::<_, ToolAccessRule>(&query)
            .bind(package_id)
            .fetch_all(pool)
            .await
    }

    /// Look up the access level a package grants for one tool.
    pub async fn find_rule_level<'e, E: PgExecutor<'e>>(
        executor: E,
        package_id: DbId,
        tool_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT access_level FROM tool_access_rules WHERE package_id = $1 AND tool_id = $2",
        )
        .bind(package_id)
        .bind(tool_id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Replace all rules of a DRAFT package in one transaction.
    ///
    /// The package row is locked first; returns `None` if it does not exist
    /// or is no longer DRAFT, leaving the rules untouched.
    pub async fn replace_rules_if_draft(
        pool: &PgPool,
        package_id: DbId,
        rules: &[ToolRuleInput],
    ) -> Result<Option<Vec<ToolAccessRule>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let status: Option<(StatusId,)> =
            sqlx::query_as("SELECT status_id FROM packages WHERE id = $1 FOR UPDATE")
                .bind(package_id)
                .fetch_optional(&mut *tx)
                .await?;
        if status.map(|s| s.0) != Some(PackageStatus::Draft.id()) {
            return Ok(None);
        }

        sqlx::query("DELETE FROM tool_access_rules WHERE package_id = $1")
            .bind(package_id)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO tool_access_rules (package_id, tool_id, access_level)
             VALUES ($1, $2, $3)
             RETURNING {RULE_COLUMNS}"
        );
        let mut created = Vec::with_capacity(rules.len());
        for rule in rules {
            let row = sqlx::query_as::<_, ToolAccessRule>(&insert)
                .bind(package_id)
                .bind(rule.tool_id)
                .bind(rule.access_level.as_str())
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;
        created.sort_by_key(|r| r.tool_id);
        Ok(Some(created))
    }
}
