//! Shared application state owning the stores.
//!
//! One explicitly constructed object, built from [`AppConfig`] and passed by
//! [`Arc`] to consumers; no global state.

use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    dao::kv::{FileBackend, KvBackend},
    error::ServiceResult,
    services::{account_service::AccountStore, game_service::GameStore},
};

/// Cheaply clonable handle to the process-wide state.
pub type SharedState = Arc<AppState>;

/// Central application state owning both stores over one shared blob.
pub struct AppState {
    accounts: AccountStore,
    games: GameStore,
}

impl AppState {
    /// Open (or create) the persisted blob and build both stores over it.
    pub async fn open(config: &AppConfig) -> ServiceResult<SharedState> {
        let backend: Arc<dyn KvBackend> = Arc::new(FileBackend::open(&config.storage_path).await?);
        Self::with_backend(backend, config.latency).await
    }

    /// Build the state over an explicit backend; tests use the in-memory one.
    pub async fn with_backend(
        backend: Arc<dyn KvBackend>,
        latency: Duration,
    ) -> ServiceResult<SharedState> {
        let accounts = AccountStore::open(Arc::clone(&backend), latency).await?;
        let games = GameStore::open(backend, latency).await?;
        Ok(Arc::new(Self { accounts, games }))
    }

    /// Identity and session store.
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Catalog store.
    pub fn games(&self) -> &GameStore {
        &self.games
    }
}
