//! Store traits shared by both persistence tiers.

use async_trait::async_trait;
use serde::Serialize;
use tablebuilder_core::section_export::duplicate_name;
use tablebuilder_core::types::DbId;

use crate::models::section::{CreateSection, Section, UpdateSection};
use crate::models::user::{CreateUser, UserCredentials, UserProfile, UserResponse};

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Which tier served a persistence call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Remote,
    Local,
}

impl StorageTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// A value together with the tier that produced it.
#[derive(Debug, Clone)]
pub struct Served<T> {
    pub value: T,
    pub tier: StorageTier,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Local storage error: {0}")]
    Local(String),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("{op} timed out after {after_ms}ms")]
    Timeout { op: &'static str, after_ms: u64 },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Whether the failure should be retried against the local tier.
    ///
    /// Unique-key violations and conflicts are answers, not outages.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Database(err) => !is_unique_violation(err),
            Self::Unavailable(_) | Self::Timeout { .. } => true,
            Self::Local(_) | Self::Conflict(_) => false,
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// Persistence of saved sections.
#[async_trait]
pub trait SectionStore: Send + Sync {
    /// Sections owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Section>, StoreError>;

    /// Every section, newest first.
    async fn list_all(&self) -> Result<Vec<Section>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Section>, StoreError>;

    async fn create(&self, user_id: DbId, input: &CreateSection) -> Result<Section, StoreError>;

    /// Returns `None` when no section has this id.
    async fn update(&self, id: DbId, input: &UpdateSection)
        -> Result<Option<Section>, StoreError>;

    /// Returns `true` when a section was removed.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Remove every section owned by `user_id`, returning how many went.
    async fn delete_for_user(&self, user_id: DbId) -> Result<u64, StoreError>;

    /// Copy section `id` into a new section owned by `user_id`, named
    /// `"<name> (Copy)"`, with a fresh id and timestamps.
    async fn duplicate(&self, id: DbId, user_id: DbId) -> Result<Option<Section>, StoreError> {
        let Some(source) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let input = CreateSection {
            name: duplicate_name(&source.name),
            settings: source.settings,
        };
        self.create(user_id, &input).await.map(Some)
    }
}

/// Persistence of accounts and backend sessions.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up by username or email.
    async fn find_credentials(&self, login: &str) -> Result<Option<UserCredentials>, StoreError>;

    async fn find_profile(&self, id: DbId) -> Result<Option<UserProfile>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the username or email is taken.
    async fn create(&self, input: &CreateUser) -> Result<UserProfile, StoreError>;

    /// All accounts, newest first.
    async fn list(&self) -> Result<Vec<UserResponse>, StoreError>;

    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Record a backend session for `user_id` under `session_id`.
    async fn open_session(&self, user_id: DbId, session_id: &str) -> Result<(), StoreError>;

    /// Close every open backend session of `user_id`.
    async fn close_sessions(&self, user_id: DbId) -> Result<u64, StoreError>;
}
