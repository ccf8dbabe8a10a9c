//! Handlers for the package catalog: public browsing and admin management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mentorhub_core::error::CoreError;
use mentorhub_core::onboarding::validate_segment;
use mentorhub_core::packages::{
    ensure_terms_editable, validate_package_terms, validate_status_transition, validate_tool_rules,
    Tier,
};
use mentorhub_core::status::PackageStatus;
use mentorhub_core::types::DbId;
use mentorhub_db::models::package::{
    CreatePackage, Package, ToolAccessRule, ToolRuleInput, UpdatePackage,
};
use mentorhub_db::repositories::{PackageRepo, ToolRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireCatalogManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /packages`.
#[derive(Debug, Deserialize)]
pub struct PackageListParams {
    pub segment: Option<String>,
    /// Requires `segment`; narrows the result to the package on sale for
    /// that pair.
    pub tier: Option<String>,
}

/// Request body for `PUT /admin/packages/{id}/rules`.
#[derive(Debug, Deserialize)]
pub struct ReplaceRulesRequest {
    pub rules: Vec<ToolRuleInput>,
}

/// A package with its tool rules.
#[derive(Debug, Serialize)]
pub struct PackageDetail {
    #[serde(flatten)]
    pub package: Package,
    pub rules: Vec<ToolAccessRule>,
}

async fn find_package(state: &AppState, id: DbId) -> AppResult<Package> {
    PackageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Package", id }))
}

// ---------------------------------------------------------------------------
// Public catalog (served from the cache)
// ---------------------------------------------------------------------------

/// GET /api/v1/packages?segment=&tier=
pub async fn list_published(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PackageListParams>,
) -> AppResult<Json<DataResponse<Vec<Package>>>> {
    let packages = match (params.segment.as_deref(), params.tier.as_deref()) {
        (Some(segment), Some(tier)) => {
            let tier: Tier = tier.parse()?;
            state.catalog.find(segment, tier).await.into_iter().collect()
        }
        (None, Some(_)) => {
            return Err(AppError::Core(CoreError::Invalid(
                "tier filter requires a segment".into(),
            )))
        }
        (segment, None) => state.catalog.list(segment).await,
    };
    Ok(Json(DataResponse { data: packages }))
}

/// GET /api/v1/packages/{id}
///
/// Only published packages are visible here.
pub async fn get_published(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PackageDetail>>> {
    let package = state
        .catalog
        .get(id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Package", id }))?;
    let rules = PackageRepo::list_rules(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: PackageDetail { package, rules },
    }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/packages
pub async fn list_all(
    State(state): State<AppState>,
    RequireCatalogManager(_admin): RequireCatalogManager,
) -> AppResult<Json<DataResponse<Vec<Package>>>> {
    let packages = PackageRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: packages }))
}

/// GET /api/v1/admin/packages/{id}
pub async fn get_package(
    State(state): State<AppState>,
    RequireCatalogManager(_admin): RequireCatalogManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PackageDetail>>> {
    let package = find_package(&state, id).await?;
    let rules = PackageRepo::list_rules(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: PackageDetail { package, rules },
    }))
}

/// POST /api/v1/admin/packages
///
/// Create a DRAFT package.
pub async fn create_package(
    State(state): State<AppState>,
    RequireCatalogManager(admin): RequireCatalogManager,
    Json(input): Json<CreatePackage>,
) -> AppResult<(StatusCode, Json<DataResponse<Package>>)> {
    validate_package_terms(&input.name, input.total_sessions, input.validity_days)?;
    validate_segment(&input.segment)?;

    let package = PackageRepo::create(&state.pool, &input).await?;
    tracing::info!(package_id = package.id, tier = %input.tier, segment = %input.segment, admin_id = admin.user_id, "Package created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: package })))
}

/// PUT /api/v1/admin/packages/{id}
///
/// Name and description are always editable; the session allotment and
/// validity only while DRAFT.
pub async fn update_package(
    State(state): State<AppState>,
    RequireCatalogManager(admin): RequireCatalogManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePackage>,
) -> AppResult<Json<DataResponse<Package>>> {
    let current = find_package(&state, id).await?;
    if input.changes_terms() {
        ensure_terms_editable(current.status()?)?;
    }
    validate_package_terms(
        input.name.as_deref().unwrap_or(&current.name),
        input.total_sessions.unwrap_or(current.total_sessions),
        input.validity_days.unwrap_or(current.validity_days),
    )?;

    // The repository re-checks DRAFT in the UPDATE itself, so a publish
    // racing this request leaves the row untouched.
    let package = PackageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Package {id} changed status during the update; its terms are frozen"
            )))
        })?;
    tracing::info!(package_id = id, admin_id = admin.user_id, "Package updated");

    if package.status()? == PackageStatus::Published {
        state.catalog.refresh(&state.pool).await?;
    }
    Ok(Json(DataResponse { data: package }))
}

/// PUT /api/v1/admin/packages/{id}/rules
///
/// Replace the whole rule set of a DRAFT package.
pub async fn replace_rules(
    State(state): State<AppState>,
    RequireCatalogManager(admin): RequireCatalogManager,
    Path(id): Path<DbId>,
    Json(input): Json<ReplaceRulesRequest>,
) -> AppResult<Json<DataResponse<Vec<ToolAccessRule>>>> {
    let pairs: Vec<_> = input
        .rules
        .iter()
        .map(|r| (r.tool_id, r.access_level))
        .collect();
    validate_tool_rules(&pairs)?;

    let package = find_package(&state, id).await?;
    ensure_terms_editable(package.status()?)?;

    for rule in &input.rules {
        ToolRepo::find_by_id(&state.pool, rule.tool_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Tool",
                id: rule.tool_id,
            }))?;
    }

    let rules = PackageRepo::replace_rules_if_draft(&state.pool, id, &input.rules)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Package {id} left DRAFT while its rules were being replaced"
            )))
        })?;
    tracing::info!(package_id = id, rules = rules.len(), admin_id = admin.user_id, "Tool rules replaced");
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/admin/packages/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    RequireCatalogManager(admin): RequireCatalogManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Package>>> {
    let package = change_status(&state, id, PackageStatus::Published).await?;
    tracing::info!(package_id = id, admin_id = admin.user_id, "Package published");
    Ok(Json(DataResponse { data: package }))
}

/// POST /api/v1/admin/packages/{id}/unpublish
///
/// Hides the package from purchase. Existing subscriptions keep their terms.
pub async fn unpublish(
    State(state): State<AppState>,
    RequireCatalogManager(admin): RequireCatalogManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Package>>> {
    let package = change_status(&state, id, PackageStatus::Unpublished).await?;
    tracing::info!(package_id = id, admin_id = admin.user_id, "Package unpublished");
    Ok(Json(DataResponse { data: package }))
}

async fn change_status(state: &AppState, id: DbId, to: PackageStatus) -> AppResult<Package> {
    let current = find_package(state, id).await?;
    let from = current.status()?;
    validate_status_transition(from, to)?;

    let package = PackageRepo::transition_status(&state.pool, id, from, to)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Package {id} changed status concurrently"
            )))
        })?;

    state.catalog.refresh(&state.pool).await?;
    Ok(package)
}
