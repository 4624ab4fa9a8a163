//! Route definitions for the `/sections` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sections;
use crate::state::AppState;

/// Routes mounted at `/sections`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sections::list_sections).post(sections::create_section),
        )
        .route("/import", post(sections::import_section))
        .route(
            "/{id}",
            get(sections::get_section)
                .put(sections::update_section)
                .delete(sections::delete_section),
        )
        .route("/{id}/duplicate", post(sections::duplicate_section))
        .route("/{id}/export", get(sections::export_section))
        .route("/{id}/export/html", get(sections::export_html))
        .route("/{id}/export/wordpress", get(sections::export_wordpress))
}
