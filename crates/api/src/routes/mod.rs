pub mod admin;
pub mod auth;
pub mod billing;
pub mod bookings;
pub mod health;
pub mod me;
pub mod mentors;
pub mod packages;
pub mod sessions;
pub mod tools;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
///
/// /me                                  profile
/// /me/onboarding                       complete onboarding (PUT)
/// /me/subscriptions                    caller's subscriptions
///
/// /tools                               list
/// /tools/{id}                          get
/// /tools/{id}/access                   entitlement decision
/// /tools/{id}/results                  list, submit
///
/// /sessions/{user_id}/availability     remaining session quota
/// /sessions/{booking_id}/complete      complete and consume (POST)
/// /sessions/{booking_id}/cancel        cancel (POST)
///
/// /bookings                            list, create
/// /bookings/{id}                       get
///
/// /mentors                             list
/// /mentors/matches                     ranked for the caller's segment
/// /mentors/{id}                        get
///
/// /packages                            published catalog
/// /packages/{id}                       published package with rules
///
/// /admin/users                         list (admin only)
/// /admin/users/{id}                    get, update, deactivate
/// /admin/packages                      list, create
/// /admin/packages/{id}                 get, update
/// /admin/packages/{id}/rules           replace rules (PUT, DRAFT only)
/// /admin/packages/{id}/publish         publish (POST)
/// /admin/packages/{id}/unpublish       unpublish (POST)
/// /admin/mentors                       create
/// /admin/mentors/{id}                  update
/// /admin/tools                         create
///
/// /billing/subscriptions               purchase webhook (signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/tools", tools::router())
        .nest("/sessions", sessions::router())
        .nest("/bookings", bookings::router())
        .nest("/mentors", mentors::router())
        .nest("/packages", packages::router())
        .nest("/admin", admin::router())
        .nest("/billing", billing::router())
}
