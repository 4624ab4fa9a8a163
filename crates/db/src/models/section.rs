//! Section entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tablebuilder_core::settings::Settings;
use tablebuilder_core::types::{DbId, Timestamp};

/// A saved, named widget configuration owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub settings: Settings,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Row shape of the `sections` table. `settings` is stored as JSONB.
#[derive(Debug, FromRow)]
pub(crate) struct SectionRow {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub settings: Json<Settings>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SectionRow> for Section {
    fn from(row: SectionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            settings: row.settings.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a section. Missing settings mean "all defaults".
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
}

/// DTO for updating a section. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSection {
    pub name: Option<String>,
    pub settings: Option<Settings>,
}
