//! In-process cache of the published package catalog.
//!
//! The only shared mutable state in the server. Readers take a short read
//! lock; a refresh builds the new snapshot off-lock and swaps it in.

use std::collections::HashMap;

use mentorhub_core::packages::Tier;
use mentorhub_core::types::DbId;
use mentorhub_db::models::package::Package;
use mentorhub_db::repositories::PackageRepo;
use sqlx::PgPool;
use tokio::sync::RwLock;

/// Published packages indexed by id and by (segment, tier).
#[derive(Debug, Default)]
struct CatalogSnapshot {
    by_id: HashMap<DbId, Package>,
    by_segment_tier: HashMap<(String, Tier), DbId>,
}

impl CatalogSnapshot {
    fn build(packages: Vec<Package>) -> Self {
        let mut snapshot = Self::default();
        for package in packages {
            match package.parsed_tier() {
                Ok(tier) => {
                    snapshot
                        .by_segment_tier
                        .insert((package.segment.clone(), tier), package.id);
                    snapshot.by_id.insert(package.id, package);
                }
                Err(e) => {
                    tracing::warn!(package_id = package.id, error = %e, "Skipping package with unknown tier");
                }
            }
        }
        snapshot
    }
}

/// Read-mostly view of PUBLISHED packages.
#[derive(Debug, Default)]
pub struct CatalogCache {
    inner: RwLock<CatalogSnapshot>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload every published package from the store.
    pub async fn refresh(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let packages = PackageRepo::list_published(pool).await?;
        self.replace(packages).await;
        Ok(())
    }

    async fn replace(&self, packages: Vec<Package>) {
        let snapshot = CatalogSnapshot::build(packages);
        let count = snapshot.by_id.len();
        *self.inner.write().await = snapshot;
        tracing::info!(published = count, "Catalog cache refreshed");
    }

    pub async fn get(&self, id: DbId) -> Option<Package> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    pub async fn find(&self, segment: &str, tier: Tier) -> Option<Package> {
        let snapshot = self.inner.read().await;
        snapshot
            .by_segment_tier
            .get(&(segment.to_string(), tier))
            .and_then(|id| snapshot.by_id.get(id))
            .cloned()
    }

    /// Published packages, optionally limited to one segment, ordered by
    /// segment then tier.
    pub async fn list(&self, segment: Option<&str>) -> Vec<Package> {
        let snapshot = self.inner.read().await;
        let mut packages: Vec<Package> = snapshot
            .by_id
            .values()
            .filter(|p| segment.map_or(true, |s| p.segment == s))
            .cloned()
            .collect();
        packages.sort_by(|a, b| {
            (&a.segment, a.parsed_tier().ok(), a.id).cmp(&(&b.segment, b.parsed_tier().ok(), b.id))
        });
        packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mentorhub_core::status::PackageStatus;

    fn package(id: DbId, segment: &str, tier: &str) -> Package {
        let now = Utc::now();
        Package {
            id,
            name: format!("{segment}-{tier}"),
            description: None,
            tier: tier.to_string(),
            segment: segment.to_string(),
            total_sessions: 4,
            validity_days: 30,
            status_id: PackageStatus::Published.id(),
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn lookups_by_id_and_segment_tier() {
        let cache = CatalogCache::new();
        cache
            .replace(vec![
                package(1, "student", "BASIC"),
                package(2, "student", "PRO"),
                package(3, "senior", "PRO"),
            ])
            .await;

        assert_eq!(cache.get(2).await.map(|p| p.id), Some(2));
        assert!(cache.get(9).await.is_none());
        assert_eq!(cache.find("senior", Tier::Pro).await.map(|p| p.id), Some(3));
        assert!(cache.find("senior", Tier::Basic).await.is_none());
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let cache = CatalogCache::new();
        cache
            .replace(vec![
                package(5, "student", "PREMIUM"),
                package(4, "student", "BASIC"),
                package(6, "senior", "PRO"),
            ])
            .await;

        let all: Vec<DbId> = cache.list(None).await.iter().map(|p| p.id).collect();
        assert_eq!(all, vec![6, 4, 5]);

        let students: Vec<DbId> = cache.list(Some("student")).await.iter().map(|p| p.id).collect();
        assert_eq!(students, vec![4, 5]);
    }

    #[tokio::test]
    async fn replace_drops_stale_entries() {
        let cache = CatalogCache::new();
        cache.replace(vec![package(1, "student", "BASIC")]).await;
        cache.replace(vec![package(2, "student", "PRO")]).await;
        assert!(cache.get(1).await.is_none());
        assert!(cache.find("student", Tier::Basic).await.is_none());
    }

    #[tokio::test]
    async fn unknown_tier_is_skipped() {
        let cache = CatalogCache::new();
        cache.replace(vec![package(1, "student", "GOLD")]).await;
        assert!(cache.list(None).await.is_empty());
    }
}
