//! Persistence for the table reservation builder.
//!
//! Two tiers sit behind one interface: a PostgreSQL "remote" tier
//! ([`remote`]) and a local JSON key-value tier ([`local`]). Handlers only
//! talk to the [`fallback`] stores, which try the remote tier first and
//! fall back to the local one when it is missing, failing, or slow.

pub mod fallback;
pub mod local;
pub mod models;
pub mod remote;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
///
/// Connections are opened on first use, so the service starts (and serves
/// from the local tier) even while the database is unreachable.
pub fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect_lazy(database_url)
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
