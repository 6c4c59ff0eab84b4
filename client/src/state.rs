//! Application state management
//!
//! The shared state handed to every service call and to the sync loop.
//! All fields are cheap to clone: the pool and the remote store are
//! reference counted and the config sits behind an `Arc`.

use crate::config::AppConfig;
use crate::remote::RemoteStore;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Local database pool
    pub db: SqlitePool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Cloud document store
    pub remote: Arc<dyn RemoteStore>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            remote,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    /// The configured user id when sync can run
    pub fn sync_user(&self) -> Option<&str> {
        if !self.config.sync_configured() {
            return None;
        }
        self.config.remote.user_id.as_deref().map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::remote::MemoryRemoteStore;

    #[tokio::test]
    async fn test_state_clone_shares_resources() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let state = AppState::new(pool, AppConfig::default(), Arc::new(MemoryRemoteStore::new()));

        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.remote, &cloned.remote));
    }

    #[tokio::test]
    async fn test_sync_user_requires_configuration() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let mut config = AppConfig::default();
        config.remote.user_id = Some("  ".to_string());
        let state = AppState::new(pool.clone(), config.clone(), Arc::new(MemoryRemoteStore::new()));
        assert_eq!(state.sync_user(), None);

        config.remote.user_id = Some("user-1".to_string());
        let state = AppState::new(pool, config, Arc::new(MemoryRemoteStore::new()));
        assert_eq!(state.sync_user(), Some("user-1"));
    }
}
