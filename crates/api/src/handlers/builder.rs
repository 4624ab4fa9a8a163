//! Editor support: defaults, control groups, live preview, validation.

use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tablebuilder_core::error::CoreError;
use tablebuilder_core::markup::render_widget;
use tablebuilder_core::settings::{editor_groups, ControlGroup, Settings};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

/// Result of `POST /builder/validate`.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Every problem found, `;`-separated. Absent when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    pub settings: Option<Settings>,
}

/// GET /api/v1/builder/defaults
pub async fn defaults() -> Json<DataResponse<Settings>> {
    Json(DataResponse {
        data: Settings::default(),
    })
}

/// GET /api/v1/builder/groups
pub async fn groups() -> Json<DataResponse<&'static [ControlGroup]>> {
    Json(DataResponse {
        data: editor_groups(),
    })
}

/// POST /api/v1/builder/preview
///
/// Render the widget for unsaved settings. The body is a settings object;
/// omitted keys take their defaults.
pub async fn preview(
    RequireAuth(_user): RequireAuth,
    Json(patch): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let settings = Settings::default().apply_patch(&patch)?;
    Ok(([(CONTENT_TYPE, "text/html; charset=utf-8")], render_widget(&settings)))
}

/// POST /api/v1/builder/validate
///
/// Check a settings object without saving it. Always 200; the report says
/// whether the settings would be accepted.
pub async fn validate(
    RequireAuth(_user): RequireAuth,
    Json(patch): Json<Value>,
) -> Json<DataResponse<ValidationReport>> {
    let outcome = Settings::default()
        .apply_patch(&patch)
        .and_then(|settings| settings.validate().map(|()| settings));

    let report = match outcome {
        Ok(settings) => ValidationReport {
            valid: true,
            errors: None,
            settings: Some(settings),
        },
        Err(CoreError::Validation(msg)) => ValidationReport {
            valid: false,
            errors: Some(msg),
            settings: None,
        },
        Err(other) => ValidationReport {
            valid: false,
            errors: Some(other.to_string()),
            settings: None,
        },
    };
    Json(DataResponse { data: report })
}
