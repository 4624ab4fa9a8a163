pub mod admin;
pub mod auth;
pub mod builder;
pub mod health;
pub mod sections;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                        login (public)
/// /auth/register                     register (public)
/// /auth/logout                       logout (requires auth)
/// /auth/me                           current session user
///
/// /sections                          list own, create
/// /sections/import                   import exported JSON (POST)
/// /sections/{id}                     get, update, delete
/// /sections/{id}/duplicate           duplicate (POST)
/// /sections/{id}/export              JSON envelope
/// /sections/{id}/export/html         standalone HTML page
/// /sections/{id}/export/wordpress    WordPress plugin zip
///
/// /builder/defaults                  default settings
/// /builder/groups                    editor control groups
/// /builder/preview                   render unsaved settings (POST)
/// /builder/validate                  check unsaved settings (POST)
///
/// /admin/users                       list (admin only)
/// /admin/users/{id}                  delete (admin only)
/// /admin/sections                    list all (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/sections", sections::router())
        .nest("/builder", builder::router())
        .nest("/admin", admin::router())
}
