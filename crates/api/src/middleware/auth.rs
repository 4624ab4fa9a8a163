//! Session extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tablebuilder_core::error::CoreError;
use tablebuilder_core::roles::ROLE_ADMIN;
use tablebuilder_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::auth::session::SessionUser;
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in user, extracted from a Bearer token whose session is
/// still registered.
///
/// Handlers receive the session explicitly through this extractor:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id (from `claims.sub`).
    pub user_id: DbId,
    /// `"admin"` or `"user"`.
    pub role: String,
    pub username: String,
    pub email: String,
    /// Token id, which doubles as the session id.
    pub session_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = state.sessions.lookup(&claims.jti)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Session has ended".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            username: user.username,
            email: user.email,
            session_id: claims.jti,
        })
    }
}
