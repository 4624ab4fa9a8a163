//! Repository for the `auth_sessions` table.

use sqlx::PgPool;
use tablebuilder_core::types::DbId;

/// Records backend sessions opened at sign-in.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, id: &str, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Revoke all open sessions for a user. Returns the count revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE auth_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
