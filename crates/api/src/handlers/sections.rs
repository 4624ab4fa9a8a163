//! Handlers for saved sections: CRUD, duplicate, and the three exports.
//!
//! Every lookup goes through [`load_owned`]: a section that exists but
//! belongs to someone else is reported as not found unless the caller is
//! an admin.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tablebuilder_core::error::CoreError;
use tablebuilder_core::markup::render_document;
use tablebuilder_core::section_export::{parse_import, SectionExport};
use tablebuilder_core::types::DbId;
use tablebuilder_core::wordpress::{build_plugin, slugify};
use tablebuilder_db::models::section::{CreateSection, Section, UpdateSection};
use tablebuilder_db::store::Served;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::{served_json, tier_header};
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Section",
        id,
    })
}

/// Load a section the caller may see.
async fn load_owned(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Served<Section>> {
    let served = state.sections.find_by_id(id).await?;
    match served.value {
        Some(section) if section.user_id == user.user_id || user.is_admin() => Ok(Served {
            value: section,
            tier: served.tier,
        }),
        _ => Err(not_found(id)),
    }
}

/// Trimmed, non-empty section name.
fn clean_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Section name must not be empty".into(),
        )));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Section name must be at most {MAX_NAME_LENGTH} characters"
        ))));
    }
    Ok(name.to_string())
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/sections
///
/// The caller's sections, newest first.
pub async fn list_sections(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sections = state.sections.list_for_user(user.user_id).await?;
    Ok(served_json(StatusCode::OK, sections))
}

/// POST /api/v1/sections
pub async fn create_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateSection>,
) -> AppResult<impl IntoResponse> {
    input.settings.validate()?;
    let input = CreateSection {
        name: clean_name(&input.name)?,
        settings: input.settings,
    };

    let created = state.sections.create(user.user_id, &input).await?;
    tracing::info!(
        section_id = created.value.id,
        user_id = user.user_id,
        tier = created.tier.as_str(),
        "Section created",
    );
    Ok(served_json(StatusCode::CREATED, created))
}

/// GET /api/v1/sections/{id}
pub async fn get_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let section = load_owned(&state, &user, id).await?;
    Ok(served_json(StatusCode::OK, section))
}

/// PUT /api/v1/sections/{id}
///
/// Rename and/or replace the settings of a section.
pub async fn update_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSection>,
) -> AppResult<impl IntoResponse> {
    load_owned(&state, &user, id).await?;

    if let Some(settings) = &input.settings {
        settings.validate()?;
    }
    let input = UpdateSection {
        name: input.name.as_deref().map(clean_name).transpose()?,
        settings: input.settings,
    };

    let updated = state.sections.update(id, &input).await?;
    let tier = updated.tier;
    let section = updated.value.ok_or_else(|| not_found(id))?;
    tracing::info!(section_id = id, user_id = user.user_id, tier = tier.as_str(), "Section updated");
    Ok(served_json(
        StatusCode::OK,
        Served {
            value: section,
            tier,
        },
    ))
}

/// DELETE /api/v1/sections/{id}
pub async fn delete_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_owned(&state, &user, id).await?;

    let deleted = state.sections.delete(id).await?;
    if !deleted.value {
        return Err(not_found(id));
    }
    tracing::info!(section_id = id, user_id = user.user_id, tier = deleted.tier.as_str(), "Section deleted");
    Ok((StatusCode::NO_CONTENT, tier_header(deleted.tier)))
}

/// POST /api/v1/sections/{id}/duplicate
///
/// Copy into a new section owned by the caller, named `"<name> (Copy)"`.
pub async fn duplicate_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_owned(&state, &user, id).await?;

    let duplicated = state.sections.duplicate(id, user.user_id).await?;
    let tier = duplicated.tier;
    let copy = duplicated.value.ok_or_else(|| not_found(id))?;
    tracing::info!(
        section_id = copy.id,
        source_id = id,
        user_id = user.user_id,
        tier = tier.as_str(),
        "Section duplicated",
    );
    Ok(served_json(StatusCode::CREATED, Served { value: copy, tier }))
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

/// GET /api/v1/sections/{id}/export
///
/// Portable JSON envelope, served as a download.
pub async fn export_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let section = load_owned(&state, &user, id).await?.value;
    let export = SectionExport::new(&section.name, &section.settings, Utc::now());

    Ok((
        [(
            CONTENT_DISPOSITION,
            attachment(&format!("{}.json", slugify(&section.name))),
        )],
        Json(export),
    ))
}

/// POST /api/v1/sections/import
///
/// Create a new section from an exported file. Any parse or validation
/// problem rejects the whole import; nothing is written.
pub async fn import_section(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let imported = parse_import(&body)?;
    imported.settings.validate()?;

    let input = CreateSection {
        name: clean_name(&imported.name)?,
        settings: imported.settings,
    };
    let created = state.sections.create(user.user_id, &input).await?;
    tracing::info!(
        section_id = created.value.id,
        user_id = user.user_id,
        tier = created.tier.as_str(),
        "Section imported",
    );
    Ok(served_json(StatusCode::CREATED, created))
}

/// GET /api/v1/sections/{id}/export/html
///
/// Standalone HTML page containing the widget. Secrets are masked.
pub async fn export_html(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let section = load_owned(&state, &user, id).await?.value;
    let html = render_document(&section.settings);

    Ok((
        [
            (CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                attachment(&format!("{}.html", slugify(&section.name))),
            ),
        ],
        html,
    ))
}

/// GET /api/v1/sections/{id}/export/wordpress
///
/// WordPress plugin archive registering the widget as a shortcode.
pub async fn export_wordpress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let section = load_owned(&state, &user, id).await?.value;
    let archive = build_plugin(&section.settings, &section.name)?;

    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                attachment(&format!("{}.zip", slugify(&section.name))),
            ),
        ],
        archive,
    ))
}
