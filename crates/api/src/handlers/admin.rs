//! Admin dashboard: every user and every section.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tablebuilder_core::credentials::is_demo_user_id;
use tablebuilder_core::error::CoreError;
use tablebuilder_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{served_json, tier_header};
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = state.users.list().await?;
    Ok(served_json(StatusCode::OK, users))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Removes the account's sections, then the account and its active sessions.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if user_id == admin.user_id {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".into(),
        ));
    }
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })
    };
    if is_demo_user_id(user_id) {
        return Err(not_found());
    }

    // Sections first, so a failure here leaves the account intact.
    let sections = state.sections.delete_for_user(user_id).await?;

    let deleted = state.users.delete(user_id).await?;
    if !deleted.value {
        return Err(not_found());
    }

    if let Err(err) = state.sessions.remove_user(user_id) {
        tracing::warn!(user_id, error = %err, "Failed to clear sessions of deleted user");
    }

    tracing::info!(
        user_id,
        admin_id = admin.user_id,
        sections_removed = sections.value,
        tier = deleted.tier.as_str(),
        "User deleted",
    );
    Ok((StatusCode::NO_CONTENT, tier_header(deleted.tier)))
}

/// GET /api/v1/admin/sections
pub async fn list_sections(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sections = state.sections.list_all().await?;
    Ok(served_json(StatusCode::OK, sections))
}
