use std::sync::Arc;

use crate::catalog::CatalogCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is either a pool handle or behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mentorhub_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Published packages, refreshed on publish/unpublish.
    pub catalog: Arc<CatalogCache>,
}
