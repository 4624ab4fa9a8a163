use std::sync::Arc;

use tablebuilder_db::fallback::{FallbackSectionStore, FallbackUserStore};
use tablebuilder_db::local::{KvStore, LocalSectionStore, LocalUserStore};
use tablebuilder_db::remote::{PgSectionStore, PgUserStore};
use tablebuilder_db::store::{SectionStore, UserStore};
use tablebuilder_db::DbPool;

use crate::auth::session::SessionRegistry;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Remote tier connection pool, absent when no database is configured.
    pub pool: Option<DbPool>,
    pub config: Arc<ServerConfig>,
    pub sections: Arc<FallbackSectionStore>,
    pub users: Arc<FallbackUserStore>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Wire the two-tier stores over `pool` (remote) and `kv` (local).
    pub fn new(config: ServerConfig, pool: Option<DbPool>, kv: Arc<dyn KvStore>) -> Self {
        let timeouts = config.storage.timeouts;

        let remote_sections = pool
            .clone()
            .map(|p| Arc::new(PgSectionStore::new(p)) as Arc<dyn SectionStore>);
        let remote_users = pool
            .clone()
            .map(|p| Arc::new(PgUserStore::new(p)) as Arc<dyn UserStore>);

        let sections = FallbackSectionStore::new(
            remote_sections,
            Arc::new(LocalSectionStore::new(Arc::clone(&kv))),
            timeouts,
        );
        let users = FallbackUserStore::new(
            remote_users,
            Arc::new(LocalUserStore::new(Arc::clone(&kv))),
            timeouts,
        );

        Self {
            pool,
            config: Arc::new(config),
            sections: Arc::new(sections),
            users: Arc::new(users),
            sessions: Arc::new(SessionRegistry::new(kv)),
        }
    }
}
