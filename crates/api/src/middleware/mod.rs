//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- identity decoded from a JWT Bearer token.
//! - [`rbac`] -- extractors that additionally require a role capability.

pub mod auth;
pub mod rbac;
