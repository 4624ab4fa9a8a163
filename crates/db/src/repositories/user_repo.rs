//! Repository for the `users` table.

use sqlx::PgPool;
use tablebuilder_core::types::DbId;

use crate::models::user::{CreateUser, UserCredentials, UserProfile, UserResponse};

const PROFILE_COLUMNS: &str = "id, username, email, role";
const CREDENTIAL_COLUMNS: &str = "id, username, email, password_hash";
const LISTING_COLUMNS: &str = "id, username, email, role, phone, created_at";

/// Provides account operations on users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning its profile.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    /// Find credentials by username or email (case-sensitive).
    pub async fn find_credentials(
        pool: &PgPool,
        login: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        let query = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users
             WHERE username = $1 OR email = $1
             ORDER BY (username = $1) DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, UserCredentials>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_profile(pool: &PgPool, id: DbId) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserResponse>, sqlx::Error> {
        let query = format!("SELECT {LISTING_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, UserResponse>(&query)
            .fetch_all(pool)
            .await
    }

    /// Delete a user. Their backend sessions go with them (cascade).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
