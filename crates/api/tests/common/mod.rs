#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use mentorhub_api::auth::jwt::{generate_access_token, JwtConfig};
use mentorhub_api::catalog::CatalogCache;
use mentorhub_api::config::ServerConfig;
use mentorhub_api::router::build_app_router;
use mentorhub_api::state::AppState;
use mentorhub_core::billing::{sign_payload, SIGNATURE_HEADER};
use mentorhub_core::packages::{AccessLevel, Tier};
use mentorhub_core::roles::Role;
use mentorhub_core::status::PackageStatus;
use mentorhub_core::types::DbId;
use mentorhub_db::models::booking::{Booking, CreateBooking};
use mentorhub_db::models::mentor::{CreateMentor, Mentor};
use mentorhub_db::models::package::{CreatePackage, Package, ToolRuleInput};
use mentorhub_db::models::subscription::{CreateSubscription, Subscription};
use mentorhub_db::models::tool::{CreateTool, Tool};
use mentorhub_db::models::user::{CreateUser, User};
use mentorhub_db::repositories::{
    BookingRepo, MentorRepo, PackageRepo, SubscriptionRepo, ToolRepo, UserRepo,
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";
pub const TEST_WEBHOOK_SECRET: &str = "test-billing-webhook-secret";
pub const TEST_SEGMENT: &str = "mid_career";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        billing_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
    }
}

/// Build the full application router, with the catalog cache loaded from
/// whatever the test seeded beforehand.
pub async fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let catalog = Arc::new(CatalogCache::new());
    catalog
        .refresh(&pool)
        .await
        .expect("catalog refresh should succeed");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), None)).await
}

/// POST a billing webhook body, signed with `secret`.
pub async fn post_signed(app: Router, uri: &str, body: serde_json::Value, secret: &str) -> Response<Body> {
    let raw = body.to_string();
    let signature = sign_payload(secret, raw.as_bytes()).unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(raw))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub fn token_for(user: &User) -> String {
    generate_access_token(
        user.id,
        user.parsed_role().unwrap(),
        user.onboarding_complete,
        &test_config().jwt,
    )
    .unwrap()
}

/// Create a user, optionally onboarded into [`TEST_SEGMENT`], and a token.
pub async fn seed_user(pool: &PgPool, name: &str, role: Role, onboarded: bool) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role,
        },
    )
    .await
    .unwrap();
    let user = if onboarded {
        UserRepo::complete_onboarding(pool, user.id, TEST_SEGMENT)
            .await
            .unwrap()
            .unwrap()
    } else {
        user
    };
    let token = token_for(&user);
    (user, token)
}

pub async fn seed_tool(pool: &PgPool, slug: &str, question_count: i32) -> Tool {
    ToolRepo::create(
        pool,
        &CreateTool {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: None,
            question_count,
            max_answer_value: 4,
        },
    )
    .await
    .unwrap()
}

/// Create a DRAFT package with `rules`, then publish it.
pub async fn seed_published_package(
    pool: &PgPool,
    tier: Tier,
    total_sessions: i32,
    rules: &[(DbId, AccessLevel)],
) -> Package {
    let package = PackageRepo::create(
        pool,
        &CreatePackage {
            name: format!("{tier} package"),
            description: None,
            tier,
            segment: TEST_SEGMENT.to_string(),
            total_sessions,
            validity_days: 90,
        },
    )
    .await
    .unwrap();
    let rules: Vec<_> = rules
        .iter()
        .map(|&(tool_id, access_level)| ToolRuleInput {
            tool_id,
            access_level,
        })
        .collect();
    PackageRepo::replace_rules_if_draft(pool, package.id, &rules)
        .await
        .unwrap()
        .unwrap();
    PackageRepo::transition_status(pool, package.id, PackageStatus::Draft, PackageStatus::Published)
        .await
        .unwrap()
        .unwrap()
}

/// A subscription active now, started yesterday.
pub async fn seed_subscription(pool: &PgPool, user_id: DbId, package: &Package) -> Subscription {
    let now = Utc::now();
    seed_subscription_window(
        pool,
        user_id,
        package,
        now - Duration::days(1),
        now + Duration::days(i64::from(package.validity_days)),
    )
    .await
}

pub async fn seed_subscription_window(
    pool: &PgPool,
    user_id: DbId,
    package: &Package,
    starts_at: chrono::DateTime<Utc>,
    expires_at: chrono::DateTime<Utc>,
) -> Subscription {
    SubscriptionRepo::create(
        pool,
        &CreateSubscription {
            user_id,
            package_id: package.id,
            billing_reference: format!("ref-{user_id}-{}", starts_at.timestamp()),
            starts_at,
            expires_at,
            total_sessions: package.total_sessions,
        },
    )
    .await
    .unwrap()
}

/// A mentor serving [`TEST_SEGMENT`], plus the mentor's own token.
pub async fn seed_mentor(pool: &PgPool, name: &str) -> (Mentor, String) {
    let (user, token) = seed_user(pool, name, Role::User, true).await;
    let mentor = MentorRepo::create(
        pool,
        &CreateMentor {
            user_id: user.id,
            display_name: name.to_string(),
            bio: None,
            segments: vec![TEST_SEGMENT.to_string()],
        },
    )
    .await
    .unwrap();
    (mentor, token)
}

/// A SCHEDULED booking tomorrow, inserted directly.
pub async fn seed_booking(pool: &PgPool, user_id: DbId, mentor_id: DbId, subscription_id: DbId) -> Booking {
    BookingRepo::create(
        pool,
        &CreateBooking {
            user_id,
            mentor_id,
            subscription_id,
            scheduled_at: Utc::now() + Duration::days(1),
            duration_mins: 60,
            notes: None,
        },
    )
    .await
    .unwrap()
}
