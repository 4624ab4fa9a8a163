//! Handlers for the `/auth` resource (login, register, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tablebuilder_core::credentials::{
    is_demo_user_id, match_demo_account, username_from_email, DEMO_ACCOUNTS,
};
use tablebuilder_core::error::CoreError;
use tablebuilder_core::roles::ROLE_USER;
use tablebuilder_core::validation::{validate_registration, RegisterInput};
use tablebuilder_db::models::user::CreateUser;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SessionUser;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{tier_header, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`. `username` may also be an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response returned by login and register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: SessionUser,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Demo pairs (when enabled) open an admin session with no backend call.
/// Otherwise credentials are checked against the user store; the profile is
/// fetched from the tier that answered, or synthesized from the credentials
/// when that fetch fails or times out.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if state.config.demo_accounts_enabled {
        if let Some(account) = match_demo_account(&input.username, &input.password) {
            tracing::warn!(
                username = account.username,
                "Demo admin credentials used to sign in"
            );
            let user = SessionUser {
                id: account.id,
                username: account.username.to_string(),
                email: account.email.to_string(),
                role: account.role().to_string(),
            };
            return Ok(Json(start_session(&state, user).await?));
        }
    }

    let found = state.users.find_credentials(&input.username).await?;
    let tier = found.tier;
    let credentials = found.value.ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &credentials.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    let user = match state.users.fetch_profile(tier, credentials.id).await {
        Some(profile) => SessionUser::from(profile),
        None => {
            tracing::info!(user_id = credentials.id, "Using profile derived from credentials");
            SessionUser {
                id: credentials.id,
                username: username_from_email(&credentials.email),
                email: credentials.email,
                role: ROLE_USER.to_string(),
            }
        }
    };

    tracing::info!(user_id = user.id, tier = tier.as_str(), "User signed in");
    Ok(Json(start_session(&state, user).await?))
}

/// POST /api/v1/auth/register
///
/// Create a `user` account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    let input = input.normalized();
    validate_registration(&input)?;

    if state.config.demo_accounts_enabled
        && DEMO_ACCOUNTS.iter().any(|a| a.username == input.username)
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is reserved".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let created = state
        .users
        .create(&CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            role: ROLE_USER.to_string(),
            phone: input.phone,
        })
        .await?;

    tracing::info!(user_id = created.value.id, tier = created.tier.as_str(), "User registered");

    let response = start_session(&state, SessionUser::from(created.value)).await?;
    Ok((StatusCode::CREATED, tier_header(created.tier), Json(response)))
}

/// POST /api/v1/auth/logout
///
/// Ends the local session and, independently, the backend sessions. Backend
/// failures are logged only; the caller always gets 204 No Content.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> StatusCode {
    if let Err(err) = state.sessions.remove(&user.session_id) {
        tracing::error!(user_id = user.user_id, error = %err, "Failed to clear local session");
    }

    if !is_demo_user_id(user.user_id) {
        if let Err(err) = state.users.close_sessions(user.user_id).await {
            tracing::warn!(user_id = user.user_id, error = %err, "Failed to close backend sessions");
        }
    }

    tracing::info!(user_id = user.user_id, "User signed out");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me
pub async fn me(user: AuthUser) -> Json<DataResponse<SessionUser>> {
    Json(DataResponse {
        data: user.session_user(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue a token, register its session, and record a backend session for
/// stored (non-demo) users.
async fn start_session(state: &AppState, user: SessionUser) -> AppResult<AuthResponse> {
    let (access_token, claims) = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state.sessions.register(&claims.jti, &user, claims.exp)?;

    if !is_demo_user_id(user.id) {
        if let Err(err) = state.users.open_session(user.id, &claims.jti).await {
            tracing::warn!(user_id = user.id, error = %err, "Failed to record backend session");
        }
    }

    Ok(AuthResponse {
        access_token,
        expires_in: claims.exp - claims.iat,
        user,
    })
}
