//! HTTP-level tests for registration, login, token refresh, logout and
//! onboarding.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json, put_json_auth};
use mentorhub_api::auth::password::hash_password;
use mentorhub_core::roles::Role;
use mentorhub_db::models::user::{CreateUser, User};
use mentorhub_db::repositories::UserRepo;
use sqlx::PgPool;

const PASSWORD: &str = "correct-horse-battery";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_login_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
            role: Role::User,
        },
    )
    .await
    .expect("user creation should succeed")
}

async fn login(app: axum::Router, username: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_returns_tokens_and_incomplete_onboarding(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({
        "username": "newcomer",
        "email": "newcomer@example.com",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["role"], "USER");
    assert_eq!(json["user"]["onboarding_complete"], false);
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({
        "username": "newcomer",
        "email": "newcomer@example.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_bad_email(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({
        "username": "newcomer",
        "email": "not-an-email",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_is_a_conflict(pool: PgPool) {
    create_login_user(&pool, "taken").await;
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({
        "username": "taken",
        "email": "other@example.com",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Login and lockout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_valid_credentials(pool: PgPool) {
    let user = create_login_user(&pool, "member").await;
    let app = common::build_test_app(pool).await;

    let response = login(app, "member", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);
    assert!(json["expires_in"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_user_are_401(pool: PgPool) {
    create_login_user(&pool, "member").await;
    let app = common::build_test_app(pool).await;

    assert_eq!(
        login(app.clone(), "member", "wrong-password-here").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(app, "ghost", PASSWORD).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn five_failures_lock_the_account(pool: PgPool) {
    create_login_user(&pool, "target").await;
    let app = common::build_test_app(pool.clone()).await;

    for _ in 0..5 {
        let response = login(app.clone(), "target", "wrong-password-here").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the correct password is refused while locked.
    let response = login(app, "target", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let stored = UserRepo::find_by_username(&pool, "target").await.unwrap().unwrap();
    assert!(stored.locked_until.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_account_cannot_log_in(pool: PgPool) {
    let user = create_login_user(&pool, "gone").await;
    UserRepo::deactivate(&pool, user.id).await.unwrap();
    let app = common::build_test_app(pool).await;

    assert_eq!(login(app, "gone", PASSWORD).await.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh and logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_and_revokes_the_old_token(pool: PgPool) {
    create_login_user(&pool, "member").await;
    let app = common::build_test_app(pool).await;
    let json = body_json(login(app.clone(), "member", PASSWORD).await).await;
    let original = json["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": original });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), original);

    let reuse = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(reuse.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_login_user(&pool, "member").await;
    let app = common::build_test_app(pool).await;
    let json = body_json(login(app.clone(), "member", PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response = post_auth(app.clone(), "/api/v1/auth/logout", access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": refresh });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_change_and_deactivation_spend_refresh_tokens(pool: PgPool) {
    create_login_user(&pool, "member").await;
    let (_root, root_token) = common::seed_user(&pool, "root", Role::SuperAdmin, true).await;
    let app = common::build_test_app(pool).await;

    let json = body_json(login(app.clone(), "member", PASSWORD).await).await;
    let user_id = json["user"]["id"].as_i64().unwrap();
    let before_promotion = json["refresh_token"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/admin/users/{user_id}");
    let response = put_json_auth(app.clone(), &uri, serde_json::json!({ "role": "ADMIN" }), &root_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = serde_json::json!({ "refresh_token": before_promotion });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(login(app.clone(), "member", PASSWORD).await).await;
    assert_eq!(json["user"]["role"], "ADMIN");
    let before_deactivation = json["refresh_token"].as_str().unwrap().to_string();

    let response = common::delete_auth(app.clone(), &uri, &root_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": before_deactivation });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_bearer_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = get_auth(app, "/api/v1/me", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_sets_segment_and_reissues_claims(pool: PgPool) {
    create_login_user(&pool, "member").await;
    let app = common::build_test_app(pool).await;
    let json = body_json(login(app.clone(), "member", PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap().to_string();

    // Matching is gated on the onboarding flag carried in the token.
    let gated = get_auth(app.clone(), "/api/v1/mentors/matches", &access).await;
    assert_eq!(gated.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/me/onboarding",
        serde_json::json!({ "segment": "career_switcher" }),
        &access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["onboarding_complete"], true);
    assert_eq!(json["user"]["segment"], "career_switcher");
    let fresh = json["access_token"].as_str().unwrap().to_string();

    let matches = get_auth(app.clone(), "/api/v1/mentors/matches", &fresh).await;
    assert_eq!(matches.status(), StatusCode::OK);

    let me = body_json(get_auth(app, "/api/v1/me", &fresh).await).await;
    assert_eq!(me["data"]["segment"], "career_switcher");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_rejects_unknown_segment(pool: PgPool) {
    let (_user, token) = common::seed_user(&pool, "member", Role::User, false).await;
    let app = common::build_test_app(pool).await;

    let response = put_json_auth(
        app,
        "/api/v1/me/onboarding",
        serde_json::json!({ "segment": "astronaut" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
