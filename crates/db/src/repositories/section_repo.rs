//! Repository for the `sections` table.

use sqlx::types::Json;
use sqlx::PgPool;
use tablebuilder_core::section_export::COPY_SUFFIX;
use tablebuilder_core::types::DbId;

use crate::models::section::{CreateSection, Section, SectionRow, UpdateSection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, settings, created_at, updated_at";

/// Provides CRUD operations for sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Insert a new section, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSection,
    ) -> Result<Section, sqlx::Error> {
        let query = format!(
            "INSERT INTO sections (user_id, name, settings)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SectionRow>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(Json(&input.settings))
            .fetch_one(pool)
            .await
            .map(Section::from)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1");
        let row = sqlx::query_as::<_, SectionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Section::from))
    }

    /// List a user's sections, most recently created first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sections WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, SectionRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Section::from).collect())
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, SectionRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Section::from).collect())
    }

    /// Update a section. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "UPDATE sections SET
                name = COALESCE($2, name),
                settings = COALESCE($3, settings),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SectionRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.settings.as_ref().map(Json))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Section::from))
    }

    /// Copy a section in one statement. Returns `None` if the source is gone.
    pub async fn duplicate(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "INSERT INTO sections (user_id, name, settings)
             SELECT $2, name || $3, settings FROM sections WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SectionRow>(&query)
            .bind(id)
            .bind(user_id)
            .bind(COPY_SUFFIX)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Section::from))
    }

    /// Delete a section. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every section owned by a user. Returns the count removed.
    pub async fn delete_by_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sections WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
