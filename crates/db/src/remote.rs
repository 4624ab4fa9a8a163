//! PostgreSQL tier.

use async_trait::async_trait;
use tablebuilder_core::types::DbId;

use crate::models::section::{CreateSection, Section, UpdateSection};
use crate::models::user::{CreateUser, UserCredentials, UserProfile, UserResponse};
use crate::repositories::{SectionRepo, SessionRepo, UserRepo};
use crate::store::{is_unique_violation, SectionStore, StoreError, UserStore};
use crate::DbPool;

/// Sections stored in the `sections` table.
#[derive(Clone)]
pub struct PgSectionStore {
    pool: DbPool,
}

impl PgSectionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionStore for PgSectionStore {
    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Section>, StoreError> {
        Ok(SectionRepo::list_by_user(&self.pool, user_id).await?)
    }

    async fn list_all(&self) -> Result<Vec<Section>, StoreError> {
        Ok(SectionRepo::list_all(&self.pool).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Section>, StoreError> {
        Ok(SectionRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, user_id: DbId, input: &CreateSection) -> Result<Section, StoreError> {
        Ok(SectionRepo::create(&self.pool, user_id, input).await?)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, StoreError> {
        Ok(SectionRepo::update(&self.pool, id, input).await?)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(SectionRepo::delete(&self.pool, id).await?)
    }

    async fn delete_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        Ok(SectionRepo::delete_by_user(&self.pool, user_id).await?)
    }

    async fn duplicate(&self, id: DbId, user_id: DbId) -> Result<Option<Section>, StoreError> {
        Ok(SectionRepo::duplicate(&self.pool, id, user_id).await?)
    }
}

/// Accounts in `users`, sessions in `auth_sessions`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_credentials(&self, login: &str) -> Result<Option<UserCredentials>, StoreError> {
        Ok(UserRepo::find_credentials(&self.pool, login).await?)
    }

    async fn find_profile(&self, id: DbId) -> Result<Option<UserProfile>, StoreError> {
        Ok(UserRepo::find_profile(&self.pool, id).await?)
    }

    async fn create(&self, input: &CreateUser) -> Result<UserProfile, StoreError> {
        UserRepo::create(&self.pool, input).await.map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Conflict("Username or email is already registered".into())
            } else {
                StoreError::Database(err)
            }
        })
    }

    async fn list(&self) -> Result<Vec<UserResponse>, StoreError> {
        Ok(UserRepo::list(&self.pool).await?)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(UserRepo::delete(&self.pool, id).await?)
    }

    async fn open_session(&self, user_id: DbId, session_id: &str) -> Result<(), StoreError> {
        Ok(SessionRepo::create(&self.pool, session_id, user_id).await?)
    }

    async fn close_sessions(&self, user_id: DbId) -> Result<u64, StoreError> {
        Ok(SessionRepo::revoke_all_for_user(&self.pool, user_id).await?)
    }
}
