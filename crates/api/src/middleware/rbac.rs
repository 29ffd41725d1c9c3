//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement. Per-booking checks (is this the driver, is this the
//! spot's owner) happen in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use parkify_core::error::CoreError;
use parkify_core::roles::{ROLE_ADMIN, ROLE_DRIVER, ROLE_OWNER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `driver` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn book(RequireDriver(user): RequireDriver) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireDriver(pub AuthUser);

impl FromRequestParts<AppState> for RequireDriver {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_DRIVER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Driver role required".into(),
            )));
        }
        Ok(RequireDriver(user))
    }
}

/// Requires `owner` or `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireOwner(pub AuthUser);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_OWNER && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Owner or Admin role required".into(),
            )));
        }
        Ok(RequireOwner(user))
    }
}
