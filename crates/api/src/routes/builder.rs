//! Route definitions for the `/builder` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::builder;
use crate::state::AppState;

/// Routes mounted at `/builder`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/defaults", get(builder::defaults))
        .route("/groups", get(builder::groups))
        .route("/preview", post(builder::preview))
        .route("/validate", post(builder::validate))
}
