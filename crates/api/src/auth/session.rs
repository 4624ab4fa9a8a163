//! Registry of active API sessions.
//!
//! Each issued token's `jti` is recorded in the local store together with
//! the user it was issued to. Signing out removes the entry, which makes
//! the token unusable before it expires.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tablebuilder_core::types::DbId;
use tablebuilder_db::local::{modify_records, read_records, KvStore, SESSIONS_KEY};
use tablebuilder_db::models::user::UserProfile;
use tablebuilder_db::store::StoreError;

/// The identity a session was opened for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<UserProfile> for SessionUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            role: profile.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionEntry {
    jti: String,
    user: SessionUser,
    /// Unix timestamp after which the entry is dropped.
    expires_at: i64,
}

pub struct SessionRegistry {
    kv: Arc<dyn KvStore>,
}

impl SessionRegistry {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Record a new session. Expired entries are pruned in the same write.
    pub fn register(&self, jti: &str, user: &SessionUser, expires_at: i64) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        modify_records(self.kv.as_ref(), SESSIONS_KEY, |entries: &mut Vec<SessionEntry>| {
            entries.retain(|e| e.expires_at > now && e.jti != jti);
            entries.push(SessionEntry {
                jti: jti.to_string(),
                user: user.clone(),
                expires_at,
            });
            Ok(())
        })
    }

    /// The user behind an unexpired session.
    pub fn lookup(&self, jti: &str) -> Result<Option<SessionUser>, StoreError> {
        let now = Utc::now().timestamp();
        let entries: Vec<SessionEntry> = read_records(self.kv.as_ref(), SESSIONS_KEY)?;
        Ok(entries
            .into_iter()
            .find(|e| e.jti == jti && e.expires_at > now)
            .map(|e| e.user))
    }

    /// End one session. Returns `true` if it was registered.
    pub fn remove(&self, jti: &str) -> Result<bool, StoreError> {
        modify_records(self.kv.as_ref(), SESSIONS_KEY, |entries: &mut Vec<SessionEntry>| {
            let before = entries.len();
            entries.retain(|e| e.jti != jti);
            Ok(entries.len() < before)
        })
    }

    /// End every session of a user, e.g. after the account is deleted.
    pub fn remove_user(&self, user_id: DbId) -> Result<usize, StoreError> {
        modify_records(self.kv.as_ref(), SESSIONS_KEY, |entries: &mut Vec<SessionEntry>| {
            let before = entries.len();
            entries.retain(|e| e.user.id != user_id);
            Ok(before - entries.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use tablebuilder_db::local::MemoryKvStore;

    use super::*;

    fn user(id: DbId) -> SessionUser {
        SessionUser {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role: "user".to_string(),
        }
    }

    #[test]
    fn register_lookup_remove() {
        let registry = SessionRegistry::new(Arc::new(MemoryKvStore::new()));
        let later = Utc::now().timestamp() + 3600;

        registry.register("jti-1", &user(1), later).unwrap();
        assert_eq!(registry.lookup("jti-1").unwrap(), Some(user(1)));
        assert_eq!(registry.lookup("jti-2").unwrap(), None);

        assert!(registry.remove("jti-1").unwrap());
        assert!(!registry.remove("jti-1").unwrap());
        assert_eq!(registry.lookup("jti-1").unwrap(), None);
    }

    #[test]
    fn expired_sessions_are_ignored_and_pruned() {
        let kv = Arc::new(MemoryKvStore::new());
        let registry = SessionRegistry::new(kv.clone());
        let now = Utc::now().timestamp();

        registry.register("old", &user(1), now - 10).unwrap();
        assert_eq!(registry.lookup("old").unwrap(), None);

        registry.register("new", &user(1), now + 600).unwrap();
        let raw = kv.get(SESSIONS_KEY).unwrap().unwrap();
        assert!(!raw.contains("\"old\""));
    }

    #[test]
    fn remove_user_ends_all_their_sessions() {
        let registry = SessionRegistry::new(Arc::new(MemoryKvStore::new()));
        let later = Utc::now().timestamp() + 3600;
        registry.register("a", &user(1), later).unwrap();
        registry.register("b", &user(1), later).unwrap();
        registry.register("c", &user(2), later).unwrap();

        assert_eq!(registry.remove_user(1).unwrap(), 2);
        assert!(registry.lookup("c").unwrap().is_some());
    }
}
