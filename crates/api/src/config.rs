use std::path::PathBuf;
use std::time::Duration;

use tablebuilder_db::fallback::StoreTimeouts;

use crate::auth::jwt::JwtConfig;

/// Where sections and accounts are persisted.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// PostgreSQL URL for the remote tier. `None` runs on local storage only.
    pub database_url: Option<String>,
    /// JSON file backing the local tier.
    pub local_store_path: PathBuf,
    pub timeouts: StoreTimeouts,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Accept the built-in demo admin credentials (default: `true`).
    pub demo_accounts_enabled: bool,
    pub storage: StorageConfig,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_millis(name: &str, default: u64) -> Duration {
    let millis: u64 = env_or(name, &default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid u64"));
    Duration::from_millis(millis)
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                   |
    /// |---------------------------|---------------------------|
    /// | `HOST`                    | `0.0.0.0`                 |
    /// | `PORT`                    | `3000`                    |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`   |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                      |
    /// | `DATABASE_URL`            | unset (local tier only)   |
    /// | `LOCAL_STORE_PATH`        | `./data/local_store.json` |
    /// | `REMOTE_READ_TIMEOUT_MS`  | `3000`                    |
    /// | `REMOTE_WRITE_TIMEOUT_MS` | `8000`                    |
    /// | `PROFILE_TIMEOUT_MS`      | `2000`                    |
    /// | `DEMO_ACCOUNTS_ENABLED`   | `true`                    |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let demo_accounts_enabled: bool = env_or("DEMO_ACCOUNTS_ENABLED", "true")
            .parse()
            .expect("DEMO_ACCOUNTS_ENABLED must be true or false");

        let defaults = StoreTimeouts::default();
        let storage = StorageConfig {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            local_store_path: env_or("LOCAL_STORE_PATH", "./data/local_store.json").into(),
            timeouts: StoreTimeouts {
                read: env_millis("REMOTE_READ_TIMEOUT_MS", defaults.read.as_millis() as u64),
                write: env_millis("REMOTE_WRITE_TIMEOUT_MS", defaults.write.as_millis() as u64),
                profile: env_millis("PROFILE_TIMEOUT_MS", defaults.profile.as_millis() as u64),
            },
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            demo_accounts_enabled,
            storage,
            jwt,
        }
    }
}
