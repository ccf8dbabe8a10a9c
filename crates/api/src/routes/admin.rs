//! Route definitions for the `/admin` back-office.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, mentors, packages, tools};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /users                      -> list_users
/// GET    /users/{id}                 -> get_user
/// PUT    /users/{id}                 -> update_user
/// DELETE /users/{id}                 -> deactivate_user
///
/// GET    /packages                   -> list_all
/// POST   /packages                   -> create_package
/// GET    /packages/{id}              -> get_package
/// PUT    /packages/{id}              -> update_package
/// PUT    /packages/{id}/rules        -> replace_rules
/// POST   /packages/{id}/publish      -> publish
/// POST   /packages/{id}/unpublish    -> unpublish
///
/// POST   /mentors                    -> create_mentor
/// PUT    /mentors/{id}               -> update_mentor
///
/// POST   /tools                      -> create_tool
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route(
            "/packages",
            get(packages::list_all).post(packages::create_package),
        )
        .route(
            "/packages/{id}",
            get(packages::get_package).put(packages::update_package),
        )
        .route("/packages/{id}/rules", put(packages::replace_rules))
        .route("/packages/{id}/publish", post(packages::publish))
        .route("/packages/{id}/unpublish", post(packages::unpublish))
        .route("/mentors", post(mentors::create_mentor))
        .route("/mentors/{id}", put(mentors::update_mentor))
        .route("/tools", post(tools::create_tool))
}
