//! Portable JSON export/import of one saved section.
//!
//! Export wraps the name and settings in a versioned envelope. Import
//! accepts that envelope or a bare `{name, settings}` object (which is what
//! a section record serializes to), and deliberately drops any id or
//! timestamps in the payload: the importer always gets a new identity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::settings::Settings;
use crate::types::Timestamp;

/// `format` tag written into every export.
pub const EXPORT_FORMAT: &str = "table-reservation-section";

/// Current envelope version. Imports from newer versions are refused.
pub const EXPORT_VERSION: u32 = 1;

/// Name given to an import that does not carry one.
pub const DEFAULT_IMPORT_NAME: &str = "Imported Section";

/// Suffix appended to a duplicated section's name.
pub const COPY_SUFFIX: &str = " (Copy)";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionExport {
    pub format: String,
    pub version: u32,
    pub name: String,
    pub settings: Settings,
    pub exported_at: Timestamp,
}

impl SectionExport {
    pub fn new(name: &str, settings: &Settings, exported_at: Timestamp) -> Self {
        Self {
            format: EXPORT_FORMAT.to_string(),
            version: EXPORT_VERSION,
            name: name.to_string(),
            settings: settings.clone(),
            exported_at,
        }
    }
}

/// The parts of an imported file that survive into a new section.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSection {
    pub name: String,
    pub settings: Settings,
}

/// Parse an uploaded configuration file.
///
/// Any problem aborts the whole import with [`CoreError::Import`]; nothing
/// is partially applied.
pub fn parse_import(raw: &str) -> Result<ImportedSection, CoreError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CoreError::Import(format!("Invalid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| CoreError::Import("Expected a JSON object".into()))?;

    if let Some(format) = object.get("format") {
        if format.as_str() != Some(EXPORT_FORMAT) {
            return Err(CoreError::Import(format!(
                "Unsupported export format {format}"
            )));
        }
    }
    if let Some(version) = object.get("version").and_then(Value::as_u64) {
        if version > u64::from(EXPORT_VERSION) {
            return Err(CoreError::Import(format!(
                "Export version {version} is newer than supported version {EXPORT_VERSION}"
            )));
        }
    }

    let settings_value = object
        .get("settings")
        .ok_or_else(|| CoreError::Import("Missing 'settings' object".into()))?;
    if !settings_value.is_object() {
        return Err(CoreError::Import("'settings' must be a JSON object".into()));
    }
    let settings: Settings = serde_json::from_value(settings_value.clone())
        .map_err(|e| CoreError::Import(format!("Invalid settings: {e}")))?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_IMPORT_NAME)
        .to_string();

    Ok(ImportedSection { name, settings })
}

/// Name for a duplicated section: `"<original> (Copy)"`.
pub fn duplicate_name(name: &str) -> String {
    format!("{name}{COPY_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::settings::ButtonStyle;

    #[test]
    fn export_then_import_keeps_settings() {
        let settings = Settings {
            title: "Sakura".to_string(),
            button_style: ButtonStyle::Classic,
            show_guest_count: false,
            ..Settings::default()
        };
        let export = SectionExport::new("Sakura Dinner", &settings, chrono::Utc::now());
        let raw = serde_json::to_string(&export).unwrap();

        let imported = parse_import(&raw).unwrap();
        assert_eq!(imported.name, "Sakura Dinner");
        assert_eq!(imported.settings, settings);
    }

    #[test]
    fn bare_section_object_is_accepted() {
        let raw = json!({
            "id": 42,
            "name": "  Brunch  ",
            "created_at": "2025-01-01T00:00:00Z",
            "settings": { "title": "Brunch" }
        })
        .to_string();
        let imported = parse_import(&raw).unwrap();
        assert_eq!(imported.name, "Brunch");
        assert_eq!(imported.settings.title, "Brunch");
    }

    #[test]
    fn missing_name_gets_default() {
        let imported = parse_import(r#"{"settings": {}}"#).unwrap();
        assert_eq!(imported.name, DEFAULT_IMPORT_NAME);
        assert_eq!(imported.settings, Settings::default());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert_matches!(parse_import("{not json"), Err(CoreError::Import(_)));
        assert_matches!(parse_import("[1, 2]"), Err(CoreError::Import(_)));
        assert_matches!(parse_import(r#"{"name": "x"}"#), Err(CoreError::Import(_)));
        assert_matches!(
            parse_import(r#"{"settings": "title=x"}"#),
            Err(CoreError::Import(_))
        );
        assert_matches!(
            parse_import(r#"{"settings": {"buttonStyle": "neon"}}"#),
            Err(CoreError::Import(_))
        );
    }

    #[test]
    fn foreign_format_and_future_version_are_rejected() {
        assert_matches!(
            parse_import(r#"{"format": "theme", "settings": {}}"#),
            Err(CoreError::Import(_))
        );
        assert_matches!(
            parse_import(&format!(
                r#"{{"format": "{EXPORT_FORMAT}", "version": 99, "settings": {{}}}}"#
            )),
            Err(CoreError::Import(_))
        );
    }

    #[test]
    fn duplicate_name_appends_suffix() {
        assert_eq!(duplicate_name("Patio"), "Patio (Copy)");
    }
}
