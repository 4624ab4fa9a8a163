//! Accounts and backend sessions in the local tier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tablebuilder_core::types::{DbId, Timestamp};

use super::{fresh_id, modify_records, read_records, KvStore, AUTH_SESSIONS_KEY, USERS_KEY};
use crate::models::user::{CreateUser, UserCredentials, UserProfile, UserResponse};
use crate::store::{StoreError, UserStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    id: DbId,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    #[serde(default)]
    phone: Option<String>,
    created_at: Timestamp,
}

impl UserRecord {
    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    id: String,
    user_id: DbId,
    created_at: Timestamp,
    #[serde(default)]
    revoked_at: Option<Timestamp>,
}

/// Users under [`USERS_KEY`], sessions under [`AUTH_SESSIONS_KEY`].
///
/// Password hashes are stored exactly as the caller provides them.
#[derive(Clone)]
pub struct LocalUserStore {
    kv: Arc<dyn KvStore>,
}

impl LocalUserStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn users(&self) -> Result<Vec<UserRecord>, StoreError> {
        read_records(self.kv.as_ref(), USERS_KEY)
    }
}

#[async_trait]
impl UserStore for LocalUserStore {
    async fn find_credentials(&self, login: &str) -> Result<Option<UserCredentials>, StoreError> {
        let users = self.users()?;
        let found = users
            .iter()
            .find(|u| u.username == login)
            .or_else(|| users.iter().find(|u| u.email == login));
        Ok(found.map(|u| UserCredentials {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            password_hash: u.password_hash.clone(),
        }))
    }

    async fn find_profile(&self, id: DbId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users()?.iter().find(|u| u.id == id).map(UserRecord::profile))
    }

    async fn create(&self, input: &CreateUser) -> Result<UserProfile, StoreError> {
        let profile = modify_records(self.kv.as_ref(), USERS_KEY, |users: &mut Vec<UserRecord>| {
            if users
                .iter()
                .any(|u| u.username == input.username || u.email == input.email)
            {
                return Err(StoreError::Conflict(
                    "Username or email is already registered".into(),
                ));
            }
            let record = UserRecord {
                id: fresh_id(users.iter().map(|u| u.id)),
                username: input.username.clone(),
                email: input.email.clone(),
                password_hash: input.password_hash.clone(),
                role: input.role.clone(),
                phone: input.phone.clone(),
                created_at: Utc::now(),
            };
            let profile = record.profile();
            users.push(record);
            Ok(profile)
        })?;
        tracing::debug!(user_id = profile.id, "User registered locally");
        Ok(profile)
    }

    async fn list(&self) -> Result<Vec<UserResponse>, StoreError> {
        let mut users: Vec<UserResponse> = self
            .users()?
            .into_iter()
            .map(|u| UserResponse {
                id: u.id,
                username: u.username,
                email: u.email,
                role: u.role,
                phone: u.phone,
                created_at: u.created_at,
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let removed = modify_records(self.kv.as_ref(), USERS_KEY, |users: &mut Vec<UserRecord>| {
            let before = users.len();
            users.retain(|u| u.id != id);
            Ok(users.len() < before)
        })?;
        if removed {
            modify_records(
                self.kv.as_ref(),
                AUTH_SESSIONS_KEY,
                |sessions: &mut Vec<SessionRecord>| {
                    sessions.retain(|s| s.user_id != id);
                    Ok(())
                },
            )?;
        }
        Ok(removed)
    }

    async fn open_session(&self, user_id: DbId, session_id: &str) -> Result<(), StoreError> {
        modify_records(
            self.kv.as_ref(),
            AUTH_SESSIONS_KEY,
            |sessions: &mut Vec<SessionRecord>| {
                sessions.push(SessionRecord {
                    id: session_id.to_string(),
                    user_id,
                    created_at: Utc::now(),
                    revoked_at: None,
                });
                Ok(())
            },
        )
    }

    async fn close_sessions(&self, user_id: DbId) -> Result<u64, StoreError> {
        modify_records(
            self.kv.as_ref(),
            AUTH_SESSIONS_KEY,
            |sessions: &mut Vec<SessionRecord>| {
                let now = Utc::now();
                let mut closed = 0;
                for session in sessions
                    .iter_mut()
                    .filter(|s| s.user_id == user_id && s.revoked_at.is_none())
                {
                    session.revoked_at = Some(now);
                    closed += 1;
                }
                Ok(closed)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::local::MemoryKvStore;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: "user".to_string(),
            phone: None,
        }
    }

    fn store() -> LocalUserStore {
        LocalUserStore::new(Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn credentials_by_username_or_email() {
        let store = store();
        let created = store
            .create(&new_user("giulia", "giulia@trattoria.example"))
            .await
            .unwrap();

        let by_name = store.find_credentials("giulia").await.unwrap().unwrap();
        let by_email = store
            .find_credentials("giulia@trattoria.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_name.password_hash, "$argon2id$stub");
        assert!(store.find_credentials("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let store = store();
        store.create(&new_user("marco", "marco@example.com")).await.unwrap();

        assert_matches!(
            store.create(&new_user("marco", "other@example.com")).await,
            Err(StoreError::Conflict(_))
        );
        assert_matches!(
            store.create(&new_user("other", "marco@example.com")).await,
            Err(StoreError::Conflict(_))
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sessions_open_and_close() {
        let store = store();
        let user = store.create(&new_user("anna", "anna@example.com")).await.unwrap();
        store.open_session(user.id, "jti-1").await.unwrap();
        store.open_session(user.id, "jti-2").await.unwrap();

        assert_eq!(store.close_sessions(user.id).await.unwrap(), 2);
        assert_eq!(store.close_sessions(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let store = store();
        let user = store.create(&new_user("luca", "luca@example.com")).await.unwrap();
        assert!(store.delete(user.id).await.unwrap());
        assert!(store.find_profile(user.id).await.unwrap().is_none());
        assert!(!store.delete(user.id).await.unwrap());
    }
}
