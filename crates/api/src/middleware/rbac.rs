//! Capability-gated extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 unless the caller's
//! role grants the named [`Capability`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mentorhub_core::error::CoreError;
use mentorhub_core::roles::Capability;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

macro_rules! capability_extractor {
    ($(#[$meta:meta])* $name:ident => $capability:expr, $message:literal) => {
        $(#[$meta])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                if !user.can($capability) {
                    return Err(AppError::Core(CoreError::Forbidden($message.into())));
                }
                Ok($name(user))
            }
        }
    };
}

capability_extractor! {
    /// Requires [`Capability::ManageUsers`] (ADMIN, SUPER_ADMIN).
    ///
    /// ```ignore
    /// async fn list(RequireUserManager(admin): RequireUserManager) -> AppResult<Json<()>> {
    ///     Ok(Json(()))
    /// }
    /// ```
    RequireUserManager => Capability::ManageUsers, "User management permission required"
}

capability_extractor! {
    /// Requires [`Capability::ManageCatalog`].
    RequireCatalogManager => Capability::ManageCatalog, "Catalog management permission required"
}

capability_extractor! {
    /// Requires [`Capability::ManageMentors`].
    RequireMentorManager => Capability::ManageMentors, "Mentor management permission required"
}
