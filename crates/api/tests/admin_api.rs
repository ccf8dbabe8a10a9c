//! HTTP-level tests for the admin back-office: package lifecycle, the
//! published catalog, user management, mentors and tools.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth, seed_tool,
    seed_user,
};
use mentorhub_core::roles::Role;
use sqlx::PgPool;

fn package_body(tier: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Career Sprint",
        "description": "Five sessions over a quarter",
        "tier": tier,
        "segment": common::TEST_SEGMENT,
        "total_sessions": 5,
        "validity_days": 90,
    })
}

async fn create_package(app: axum::Router, token: &str, tier: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/admin/packages", package_body(tier), token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Package lifecycle and catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn package_lifecycle_draft_publish_unpublish(pool: PgPool) {
    let tool = seed_tool(&pool, "values-compass", 10).await;
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let (_user, user_token) = seed_user(&pool, "member", Role::User, true).await;
    let app = common::build_test_app(pool).await;

    let id = create_package(app.clone(), &admin_token, "PRO").await;

    // DRAFT packages are not in the public catalog.
    let catalog = body_json(get_auth(app.clone(), "/api/v1/packages", &user_token).await).await;
    assert!(catalog["data"].as_array().unwrap().is_empty());

    let rules = serde_json::json!({ "rules": [{ "tool_id": tool.id, "access_level": "TEASER" }] });
    let response = put_json_auth(app.clone(), &format!("/api/v1/admin/packages/{id}/rules"), rules.clone(), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"][0]["access_level"], "TEASER");

    let response = post_auth(app.clone(), &format!("/api/v1/admin/packages/{id}/publish"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status_id"], 2);
    assert!(json["data"]["published_at"].is_string());

    // The cache was refreshed on publish.
    let catalog = body_json(get_auth(app.clone(), "/api/v1/packages", &user_token).await).await;
    assert_eq!(catalog["data"][0]["id"], id);
    let detail = body_json(get_auth(app.clone(), &format!("/api/v1/packages/{id}"), &user_token).await).await;
    assert_eq!(detail["data"]["rules"][0]["tool_id"], tool.id);

    // Terms are frozen once published.
    let response = put_json_auth(app.clone(), &format!("/api/v1/admin/packages/{id}/rules"), rules, &admin_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/packages/{id}"),
        serde_json::json!({ "total_sessions": 10 }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Descriptive fields stay editable.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/packages/{id}"),
        serde_json::json!({ "name": "Career Sprint 2" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Career Sprint 2");

    let response = post_auth(app.clone(), &format!("/api/v1/admin/packages/{id}/unpublish"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = body_json(get_auth(app.clone(), "/api/v1/packages", &user_token).await).await;
    assert!(catalog["data"].as_array().unwrap().is_empty());
    let hidden = get_auth(app, &format!("/api/v1/packages/{id}"), &user_token).await;
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_published_package_for_segment_and_tier_conflicts(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let app = common::build_test_app(pool).await;

    let first = create_package(app.clone(), &admin_token, "BASIC").await;
    let second = create_package(app.clone(), &admin_token, "BASIC").await;

    let ok = post_auth(app.clone(), &format!("/api/v1/admin/packages/{first}/publish"), &admin_token).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let clash = post_auth(app, &format!("/api/v1/admin/packages/{second}/publish"), &admin_token).await;
    assert_eq!(clash.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn catalog_lookup_by_segment_and_tier(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let (_user, user_token) = seed_user(&pool, "member", Role::User, true).await;
    let app = common::build_test_app(pool).await;

    let basic = create_package(app.clone(), &admin_token, "BASIC").await;
    let pro = create_package(app.clone(), &admin_token, "PRO").await;
    for id in [basic, pro] {
        let response = post_auth(app.clone(), &format!("/api/v1/admin/packages/{id}/publish"), &admin_token).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let uri = format!("/api/v1/packages?segment={}&tier=PRO", common::TEST_SEGMENT);
    let json = body_json(get_auth(app.clone(), &uri, &user_token).await).await;
    let found = json["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], pro);

    let uri = format!("/api/v1/packages?segment={}&tier=PREMIUM", common::TEST_SEGMENT);
    let json = body_json(get_auth(app.clone(), &uri, &user_token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let uri = format!("/api/v1/packages?segment={}&tier=GOLD", common::TEST_SEGMENT);
    let response = get_auth(app.clone(), &uri, &user_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app, "/api/v1/packages?tier=PRO", &user_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn draft_cannot_be_unpublished(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let app = common::build_test_app(pool).await;
    let id = create_package(app.clone(), &admin_token, "PREMIUM").await;

    let response = post_auth(app, &format!("/api/v1/admin/packages/{id}/unpublish"), &admin_token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_tool_rules_are_invalid(pool: PgPool) {
    let tool = seed_tool(&pool, "values-compass", 10).await;
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let app = common::build_test_app(pool).await;
    let id = create_package(app.clone(), &admin_token, "PRO").await;

    let rules = serde_json::json!({ "rules": [
        { "tool_id": tool.id, "access_level": "FULL" },
        { "tool_id": tool.id, "access_level": "LOCKED" },
    ]});
    let response = put_json_auth(app.clone(), &format!("/api/v1/admin/packages/{id}/rules"), rules, &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unknown = serde_json::json!({ "rules": [{ "tool_id": 999_999, "access_level": "FULL" }] });
    let response = put_json_auth(app, &format!("/api/v1/admin/packages/{id}/rules"), unknown, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_package_terms_are_rejected(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let app = common::build_test_app(pool).await;

    let mut body = package_body("PRO");
    body["validity_days"] = serde_json::json!(0);
    let response = post_json_auth(app, "/api/v1/admin/packages", body, &admin_token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn regular_user_cannot_manage_catalog(pool: PgPool) {
    let (_user, token) = seed_user(&pool, "member", Role::User, true).await;
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(app.clone(), "/api/v1/admin/packages", package_body("PRO"), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let tool = serde_json::json!({ "slug": "x", "name": "X", "question_count": 3, "max_answer_value": 4 });
    let response = post_json_auth(app, "/api/v1/admin/tools", tool, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_tools(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let app = common::build_test_app(pool).await;

    let tool = serde_json::json!({ "slug": "work-style", "name": "Work Style", "question_count": 12, "max_answer_value": 5 });
    let response = post_json_auth(app.clone(), "/api/v1/admin/tools", tool.clone(), &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let duplicate = post_json_auth(app.clone(), "/api/v1/admin/tools", tool, &admin_token).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let bad = serde_json::json!({ "slug": "Bad Slug", "name": "Bad", "question_count": 3, "max_answer_value": 4 });
    let response = post_json_auth(app, "/api/v1/admin/tools", bad, &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_deactivates_users(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let (user, _) = seed_user(&pool, "member", Role::User, true).await;
    let app = common::build_test_app(pool).await;

    let listed = body_json(get_auth(app.clone(), "/api/v1/admin/users", &admin_token).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);

    let uri = format!("/api/v1/admin/users/{}", user.id);
    assert_eq!(delete_auth(app.clone(), &uri, &admin_token).await.status(), StatusCode::NO_CONTENT);
    let fetched = body_json(get_auth(app.clone(), &uri, &admin_token).await).await;
    assert_eq!(fetched["data"]["is_active"], false);

    assert_eq!(delete_auth(app, &uri, &admin_token).await.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_super_admin_grants_staff_roles(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let (_root, root_token) = seed_user(&pool, "root", Role::SuperAdmin, true).await;
    let (user, _) = seed_user(&pool, "member", Role::User, true).await;
    let app = common::build_test_app(pool).await;
    let uri = format!("/api/v1/admin/users/{}", user.id);
    let promote = serde_json::json!({ "role": "ADMIN" });

    let response = put_json_auth(app.clone(), &uri, promote.clone(), &admin_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(app, &uri, promote, &root_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "ADMIN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_touch_another_admin(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let (peer, _) = seed_user(&pool, "peer", Role::Admin, true).await;
    let app = common::build_test_app(pool).await;

    let response = delete_auth(app, &format!("/api/v1/admin/users/{}", peer.id), &admin_token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_deactivate_self(pool: PgPool) {
    let (admin, admin_token) = seed_user(&pool, "admin", Role::SuperAdmin, true).await;
    let app = common::build_test_app(pool).await;

    let response = delete_auth(app, &format!("/api/v1/admin/users/{}", admin.id), &admin_token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn regular_user_cannot_list_users(pool: PgPool) {
    let (_user, token) = seed_user(&pool, "member", Role::User, true).await;
    let app = common::build_test_app(pool).await;

    let response = get_auth(app, "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Mentors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_and_updates_mentors(pool: PgPool) {
    let (_admin, admin_token) = seed_user(&pool, "admin", Role::Admin, true).await;
    let (user, user_token) = seed_user(&pool, "coach", Role::User, true).await;
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({
        "user_id": user.id,
        "display_name": "Coach",
        "segments": ["mid_career", "senior"],
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/mentors", body.clone(), &admin_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let mentor_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let duplicate = post_json_auth(app.clone(), "/api/v1/admin/mentors", body, &admin_token).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let bad_segment = serde_json::json!({ "segments": ["astronaut"] });
    let response = put_json_auth(app.clone(), &format!("/api/v1/admin/mentors/{mentor_id}"), bad_segment, &admin_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let pause = serde_json::json!({ "accepting_bookings": false });
    let response = put_json_auth(app.clone(), &format!("/api/v1/admin/mentors/{mentor_id}"), pause, &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(get_auth(app, &format!("/api/v1/mentors/{mentor_id}"), &user_token).await).await;
    assert_eq!(fetched["data"]["accepting_bookings"], false);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database_and_catalog(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = common::get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["catalog_packages"], 0);
}
