//! Two-tier stores: remote first, local on failure.
//!
//! Every operation is attempted against the remote tier under a timeout.
//! A recoverable failure (see [`StoreError::is_recoverable`]) or an absent
//! remote tier sends the same operation to the local tier. The returned
//! [`Served`] records which tier answered.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tablebuilder_core::types::DbId;

use crate::models::section::{CreateSection, Section, UpdateSection};
use crate::models::user::{CreateUser, UserCredentials, UserProfile, UserResponse};
use crate::store::{SectionStore, Served, StorageTier, StoreError, UserStore};

/// Bounds on remote calls before the local tier takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreTimeouts {
    /// Lookups and listings.
    pub read: Duration,
    /// Creates, updates, deletes, duplicates.
    pub write: Duration,
    /// Profile fetch right after sign-in.
    pub profile: Duration,
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(3_000),
            write: Duration::from_millis(8_000),
            profile: Duration::from_millis(2_000),
        }
    }
}

/// Race `fut` against a timer. The timer winning is a
/// [`StoreError::Timeout`]; the remote future is dropped.
pub async fn with_timeout<T>(
    op: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            op,
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Run `remote` (if any) and fall back to `local`. `local` is only polled
/// when the remote tier did not answer.
async fn reconcile<T, R, L>(
    op: &'static str,
    limit: Duration,
    remote: Option<R>,
    local: L,
) -> Result<Served<T>, StoreError>
where
    R: Future<Output = Result<T, StoreError>>,
    L: Future<Output = Result<T, StoreError>>,
{
    match remote {
        Some(remote) => match with_timeout(op, limit, remote).await {
            Ok(value) => {
                return Ok(Served {
                    value,
                    tier: StorageTier::Remote,
                })
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(op, error = %err, "Remote store failed, using local storage");
            }
            Err(err) => return Err(err),
        },
        None => tracing::debug!(op, "No remote store configured, using local storage"),
    }

    let value = local.await.inspect_err(|err| {
        tracing::error!(op, error = %err, "Local storage failed");
    })?;
    Ok(Served {
        value,
        tier: StorageTier::Local,
    })
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

pub struct FallbackSectionStore {
    remote: Option<Arc<dyn SectionStore>>,
    local: Arc<dyn SectionStore>,
    timeouts: StoreTimeouts,
}

impl FallbackSectionStore {
    pub fn new(
        remote: Option<Arc<dyn SectionStore>>,
        local: Arc<dyn SectionStore>,
        timeouts: StoreTimeouts,
    ) -> Self {
        Self {
            remote,
            local,
            timeouts,
        }
    }

    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn list_for_user(&self, user_id: DbId) -> Result<Served<Vec<Section>>, StoreError> {
        reconcile(
            "list_sections",
            self.timeouts.read,
            self.remote.as_deref().map(|r| r.list_for_user(user_id)),
            self.local.list_for_user(user_id),
        )
        .await
    }

    pub async fn list_all(&self) -> Result<Served<Vec<Section>>, StoreError> {
        reconcile(
            "list_all_sections",
            self.timeouts.read,
            self.remote.as_deref().map(|r| r.list_all()),
            self.local.list_all(),
        )
        .await
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Served<Option<Section>>, StoreError> {
        reconcile(
            "find_section",
            self.timeouts.read,
            self.remote.as_deref().map(|r| r.find_by_id(id)),
            self.local.find_by_id(id),
        )
        .await
    }

    pub async fn create(
        &self,
        user_id: DbId,
        input: &CreateSection,
    ) -> Result<Served<Section>, StoreError> {
        reconcile(
            "create_section",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.create(user_id, input)),
            self.local.create(user_id, input),
        )
        .await
    }

    pub async fn update(
        &self,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Served<Option<Section>>, StoreError> {
        reconcile(
            "update_section",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.update(id, input)),
            self.local.update(id, input),
        )
        .await
    }

    pub async fn delete(&self, id: DbId) -> Result<Served<bool>, StoreError> {
        reconcile(
            "delete_section",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.delete(id)),
            self.local.delete(id),
        )
        .await
    }

    pub async fn delete_for_user(&self, user_id: DbId) -> Result<Served<u64>, StoreError> {
        reconcile(
            "delete_user_sections",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.delete_for_user(user_id)),
            self.local.delete_for_user(user_id),
        )
        .await
    }

    pub async fn duplicate(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Served<Option<Section>>, StoreError> {
        reconcile(
            "duplicate_section",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.duplicate(id, user_id)),
            self.local.duplicate(id, user_id),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub struct FallbackUserStore {
    remote: Option<Arc<dyn UserStore>>,
    local: Arc<dyn UserStore>,
    timeouts: StoreTimeouts,
}

impl FallbackUserStore {
    pub fn new(
        remote: Option<Arc<dyn UserStore>>,
        local: Arc<dyn UserStore>,
        timeouts: StoreTimeouts,
    ) -> Self {
        Self {
            remote,
            local,
            timeouts,
        }
    }

    fn tier(&self, tier: StorageTier) -> Option<&dyn UserStore> {
        match tier {
            StorageTier::Remote => self.remote.as_deref(),
            StorageTier::Local => Some(self.local.as_ref()),
        }
    }

    /// Credentials by username or email.
    ///
    /// A remote miss also consults the local tier, so accounts registered
    /// during an outage can still sign in once the remote tier is back.
    pub async fn find_credentials(
        &self,
        login: &str,
    ) -> Result<Served<Option<UserCredentials>>, StoreError> {
        let served = reconcile(
            "find_credentials",
            self.timeouts.read,
            self.remote.as_deref().map(|r| r.find_credentials(login)),
            self.local.find_credentials(login),
        )
        .await?;

        if served.value.is_none() && served.tier == StorageTier::Remote {
            if let Some(found) = self.local.find_credentials(login).await? {
                return Ok(Served {
                    value: Some(found),
                    tier: StorageTier::Local,
                });
            }
        }
        Ok(served)
    }

    /// Profile from the tier that authenticated the user, bounded by the
    /// short profile timeout. Any failure is logged and yields `None`.
    pub async fn fetch_profile(&self, tier: StorageTier, id: DbId) -> Option<UserProfile> {
        let store = self.tier(tier)?;
        match with_timeout("fetch_profile", self.timeouts.profile, store.find_profile(id)).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(user_id = id, tier = tier.as_str(), error = %err, "Profile fetch failed");
                None
            }
        }
    }

    pub async fn create(&self, input: &CreateUser) -> Result<Served<UserProfile>, StoreError> {
        reconcile(
            "create_user",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.create(input)),
            self.local.create(input),
        )
        .await
    }

    pub async fn list(&self) -> Result<Served<Vec<UserResponse>>, StoreError> {
        reconcile(
            "list_users",
            self.timeouts.read,
            self.remote.as_deref().map(|r| r.list()),
            self.local.list(),
        )
        .await
    }

    pub async fn delete(&self, id: DbId) -> Result<Served<bool>, StoreError> {
        reconcile(
            "delete_user",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.delete(id)),
            self.local.delete(id),
        )
        .await
    }

    pub async fn open_session(
        &self,
        user_id: DbId,
        session_id: &str,
    ) -> Result<Served<()>, StoreError> {
        reconcile(
            "open_session",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.open_session(user_id, session_id)),
            self.local.open_session(user_id, session_id),
        )
        .await
    }

    pub async fn close_sessions(&self, user_id: DbId) -> Result<Served<u64>, StoreError> {
        reconcile(
            "close_sessions",
            self.timeouts.write,
            self.remote.as_deref().map(|r| r.close_sessions(user_id)),
            self.local.close_sessions(user_id),
        )
        .await
    }
}
