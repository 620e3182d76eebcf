//! Identity store: the known accounts plus the single active session.

use std::{sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::sleep};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        kv::KvBackend,
        models::{AccountEntity, Role},
        storage::{StorageError, StorageResult},
    },
    dto::account::{
        AccountSummary, CreateAccountInput, Credentials, RegisterInput, UpdateAccountInput,
    },
    error::{ServiceError, ServiceResult},
};

/// Key under which the account collection is persisted.
const ACCOUNTS_KEY: &str = "bh_users";
/// Key under which the active session is persisted.
const SESSION_KEY: &str = "bh_current_user";

/// Account and session store.
///
/// Owns its state explicitly: construct once per process with [`AccountStore::open`]
/// and share by reference. Mutations are applied and persisted before the
/// simulated latency resolves, so callers always observe their own writes.
pub struct AccountStore {
    backend: Arc<dyn KvBackend>,
    accounts: RwLock<Vec<AccountEntity>>,
    session: RwLock<Option<AccountSummary>>,
    latency: Duration,
}

impl AccountStore {
    /// Load the persisted collection (installing the seed when absent or
    /// unreadable) and restore any persisted session.
    pub async fn open(backend: Arc<dyn KvBackend>, latency: Duration) -> ServiceResult<Self> {
        let accounts = match load_collection(&backend).await? {
            Some(list) => list,
            None => {
                let seed = seed_accounts();
                persist_collection(&backend, &seed).await?;
                info!(count = seed.len(), "installed account seed");
                seed
            }
        };

        let session = match backend.get(SESSION_KEY).await? {
            Some(value) => match serde_json::from_value::<AccountSummary>(value) {
                Ok(summary) => {
                    info!(account = %summary.id, "restored persisted session");
                    Some(summary)
                }
                Err(err) => {
                    warn!(error = %err, "persisted session unreadable; discarding it");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            backend,
            accounts: RwLock::new(accounts),
            session: RwLock::new(session),
            latency,
        })
    }

    /// Check the supplied credentials and open a session on success.
    ///
    /// Email matching is case-insensitive, password matching is exact.
    pub async fn authenticate(&self, credentials: Credentials) -> ServiceResult<AccountSummary> {
        credentials.validate()?;
        let normalized = credentials.email.to_lowercase();

        let summary = {
            let guard = self.accounts.read().await;
            guard
                .iter()
                .find(|account| {
                    account.normalized_email() == normalized
                        && account.password == credentials.password
                })
                .map(AccountSummary::from)
                .ok_or(ServiceError::InvalidCredentials)?
        };

        self.set_session(Some(summary.clone())).await?;
        info!(account = %summary.id, "session opened");

        self.simulate_latency().await;
        Ok(summary)
    }

    /// Create an account with the default role.
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<AccountSummary> {
        input.validate()?;

        let summary = {
            let mut guard = self.accounts.write().await;
            ensure_email_free(&guard, &input.email, None)?;

            let entity = AccountEntity {
                id: Uuid::new_v4(),
                name: input.name,
                email: input.email,
                role: Role::User,
                password: input.password,
            };
            let summary = AccountSummary::from(&entity);
            guard.push(entity);
            persist_collection(&self.backend, &guard).await?;
            summary
        };

        info!(account = %summary.id, "registered account");
        self.simulate_latency().await;
        Ok(summary)
    }

    /// The active account, if a session is open.
    pub async fn current_account(&self) -> Option<AccountSummary> {
        self.session.read().await.clone()
    }

    /// Whether the active account holds the admin role.
    pub async fn is_privileged(&self) -> bool {
        let guard = self.session.read().await;
        matches!(guard.as_ref().map(|summary| summary.role), Some(Role::Admin))
    }

    /// Mock bearer token for the active session.
    pub async fn session_token(&self) -> Option<String> {
        let guard = self.session.read().await;
        guard
            .as_ref()
            .map(|summary| format!("mock-token-{}", summary.id))
    }

    /// Clear the active session, both in memory and in the persisted blob.
    pub async fn end_session(&self) -> ServiceResult<()> {
        self.set_session(None).await?;
        info!("session closed");
        Ok(())
    }

    /// All accounts as password-free summaries.
    pub async fn list_accounts(&self) -> ServiceResult<Vec<AccountSummary>> {
        let summaries = {
            let guard = self.accounts.read().await;
            guard.iter().map(AccountSummary::from).collect()
        };
        self.simulate_latency().await;
        Ok(summaries)
    }

    /// Create an account with an explicit role (administrative path).
    pub async fn create_account(&self, input: CreateAccountInput) -> ServiceResult<AccountSummary> {
        input.validate()?;

        let summary = {
            let mut guard = self.accounts.write().await;
            ensure_email_free(&guard, &input.email, None)?;

            let entity = AccountEntity {
                id: Uuid::new_v4(),
                name: input.name,
                email: input.email,
                role: input.role,
                password: input.password,
            };
            let summary = AccountSummary::from(&entity);
            guard.push(entity);
            persist_collection(&self.backend, &guard).await?;
            summary
        };

        info!(account = %summary.id, role = ?summary.role, "created account");
        self.simulate_latency().await;
        Ok(summary)
    }

    /// Merge the supplied fields into the matching account.
    ///
    /// Updating the active account refreshes the session so the caller keeps
    /// seeing current data.
    pub async fn update_account(
        &self,
        id: Uuid,
        patch: UpdateAccountInput,
    ) -> ServiceResult<AccountSummary> {
        patch.validate()?;

        let summary = {
            let mut guard = self.accounts.write().await;
            // Existence first so a missing account reports not-found even
            // when the patch carries a taken email.
            let position = guard
                .iter()
                .position(|account| account.id == id)
                .ok_or_else(|| ServiceError::NotFound(format!("account `{id}` not found")))?;
            if let Some(ref new_email) = patch.email {
                ensure_email_free(&guard, new_email, Some(id))?;
            }

            let entity = &mut guard[position];

            if let Some(name) = patch.name {
                entity.name = name;
            }
            if let Some(email) = patch.email {
                entity.email = email;
            }
            if let Some(password) = patch.password {
                entity.password = password;
            }
            if let Some(role) = patch.role {
                entity.role = role;
            }

            let summary = AccountSummary::from(&*entity);
            persist_collection(&self.backend, &guard).await?;
            summary
        };

        let targets_active = {
            let guard = self.session.read().await;
            guard.as_ref().is_some_and(|current| current.id == id)
        };
        if targets_active {
            self.set_session(Some(summary.clone())).await?;
        }

        self.simulate_latency().await;
        Ok(summary)
    }

    /// Remove the matching account; removing the active one ends the session.
    pub async fn delete_account(&self, id: Uuid) -> ServiceResult<()> {
        {
            let mut guard = self.accounts.write().await;
            let before = guard.len();
            guard.retain(|account| account.id != id);
            if guard.len() == before {
                return Err(ServiceError::NotFound(format!("account `{id}` not found")));
            }
            persist_collection(&self.backend, &guard).await?;
        }

        let targets_active = {
            let guard = self.session.read().await;
            guard.as_ref().is_some_and(|current| current.id == id)
        };
        if targets_active {
            self.set_session(None).await?;
            info!(account = %id, "deleted the active account; session closed");
        } else {
            info!(account = %id, "deleted account");
        }

        self.simulate_latency().await;
        Ok(())
    }

    async fn set_session(&self, next: Option<AccountSummary>) -> StorageResult<()> {
        match next {
            Some(summary) => {
                let value = serde_json::to_value(&summary)
                    .map_err(|source| StorageError::encode(SESSION_KEY, source))?;
                self.backend.put(SESSION_KEY, value).await?;
                let mut guard = self.session.write().await;
                *guard = Some(summary);
            }
            None => {
                self.backend.remove(SESSION_KEY).await?;
                let mut guard = self.session.write().await;
                guard.take();
            }
        }
        Ok(())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

/// Reject `email` when another account already uses it, comparing
/// case-insensitively. `exclude` skips the account being updated.
fn ensure_email_free(
    accounts: &[AccountEntity],
    email: &str,
    exclude: Option<Uuid>,
) -> ServiceResult<()> {
    let normalized = email.to_lowercase();
    let taken = accounts.iter().any(|account| {
        account.normalized_email() == normalized && exclude != Some(account.id)
    });
    if taken {
        return Err(ServiceError::EmailTaken(email.to_owned()));
    }
    Ok(())
}

async fn load_collection(
    backend: &Arc<dyn KvBackend>,
) -> StorageResult<Option<Vec<AccountEntity>>> {
    let Some(value) = backend.get(ACCOUNTS_KEY).await? else {
        return Ok(None);
    };
    // An empty persisted collection is kept as-is; only an absent or
    // unreadable one triggers the seed.
    match serde_json::from_value::<Vec<AccountEntity>>(value) {
        Ok(list) => Ok(Some(list)),
        Err(err) => {
            warn!(error = %err, "persisted accounts unreadable; reinstalling seed");
            Ok(None)
        }
    }
}

async fn persist_collection(
    backend: &Arc<dyn KvBackend>,
    accounts: &[AccountEntity],
) -> StorageResult<()> {
    let value = serde_json::to_value(accounts)
        .map_err(|source| StorageError::encode(ACCOUNTS_KEY, source))?;
    backend.put(ACCOUNTS_KEY, value).await
}

/// Accounts installed when no persisted collection exists.
fn seed_accounts() -> Vec<AccountEntity> {
    vec![
        AccountEntity {
            id: Uuid::new_v4(),
            name: "Alice Admin".into(),
            email: "alice.admin@boardhub.dev".into(),
            role: Role::Admin,
            password: "admin123".into(),
        },
        AccountEntity {
            id: Uuid::new_v4(),
            name: "Bob Admin".into(),
            email: "bob.admin@boardhub.dev".into(),
            role: Role::Admin,
            password: "admin123".into(),
        },
        AccountEntity {
            id: Uuid::new_v4(),
            name: "Charlie User".into(),
            email: "charlie.user@boardhub.dev".into(),
            role: Role::User,
            password: "user123".into(),
        },
        AccountEntity {
            id: Uuid::new_v4(),
            name: "Diane User".into(),
            email: "diane.user@boardhub.dev".into(),
            role: Role::User,
            password: "user123".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::kv::MemoryBackend;

    async fn open_store() -> AccountStore {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        AccountStore::open(backend, Duration::ZERO).await.unwrap()
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn authenticate_matches_email_case_insensitively() {
        let store = open_store().await;

        let summary = store
            .authenticate(credentials("Alice.Admin@boardhub.dev", "admin123"))
            .await
            .unwrap();

        assert_eq!(summary.email, "alice.admin@boardhub.dev");
        assert_eq!(summary.role, Role::Admin);
        assert!(store.is_privileged().await);
        assert_eq!(store.current_account().await, Some(summary));
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password() {
        let store = open_store().await;

        let err = store
            .authenticate(credentials("alice.admin@boardhub.dev", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidCredentials));
        assert_eq!(store.current_account().await, None);
        assert!(!store.is_privileged().await);
    }

    #[tokio::test]
    async fn summaries_never_expose_the_password() {
        let store = open_store().await;
        let listed = store.list_accounts().await.unwrap();

        assert_eq!(listed.len(), 4);
        for summary in listed {
            let value = serde_json::to_value(&summary).unwrap();
            assert!(value.get("password").is_none());
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_case_insensitively() {
        let store = open_store().await;
        let before = store.list_accounts().await.unwrap().len();

        let err = store
            .register(RegisterInput {
                name: "Impostor".into(),
                email: "ALICE.ADMIN@boardhub.dev".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::EmailTaken(_)));
        assert_eq!(store.list_accounts().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn register_assigns_the_default_role() {
        let store = open_store().await;

        let summary = store
            .register(RegisterInput {
                name: "Eve Newcomer".into(),
                email: "eve@boardhub.dev".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();

        assert_eq!(summary.role, Role::User);
        assert_eq!(store.list_accounts().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let store = open_store().await;
        let target = store.list_accounts().await.unwrap().remove(2);

        let updated = store
            .update_account(
                target.id,
                UpdateAccountInput {
                    name: Some("Charlie Renamed".into()),
                    ..UpdateAccountInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Charlie Renamed");
        assert_eq!(updated.email, target.email);
        assert_eq!(updated.role, target.role);
    }

    #[tokio::test]
    async fn update_unknown_account_fails_and_changes_nothing() {
        let store = open_store().await;
        let before = store.list_accounts().await.unwrap();

        let err = store
            .update_account(
                Uuid::new_v4(),
                UpdateAccountInput {
                    name: Some("Nobody".into()),
                    ..UpdateAccountInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(store.list_accounts().await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_unknown_account_reports_not_found_even_with_a_taken_email() {
        let store = open_store().await;

        let err = store
            .update_account(
                Uuid::new_v4(),
                UpdateAccountInput {
                    email: Some("alice.admin@boardhub.dev".into()),
                    ..UpdateAccountInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn corrupt_persisted_accounts_are_replaced_by_the_seed() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        backend
            .put(ACCOUNTS_KEY, serde_json::json!({"oops": true}))
            .await
            .unwrap();

        let store = AccountStore::open(Arc::clone(&backend), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.list_accounts().await.unwrap().len(), 4);
        let persisted = backend.get(ACCOUNTS_KEY).await.unwrap().unwrap();
        assert_eq!(persisted.as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn an_empty_persisted_collection_is_kept_as_is() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        backend
            .put(ACCOUNTS_KEY, serde_json::json!([]))
            .await
            .unwrap();

        let store = AccountStore::open(backend, Duration::ZERO).await.unwrap();

        assert!(store.list_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_rejects_email_already_used_by_another_account() {
        let store = open_store().await;
        let accounts = store.list_accounts().await.unwrap();

        let err = store
            .update_account(
                accounts[2].id,
                UpdateAccountInput {
                    email: Some("Bob.Admin@boardhub.dev".into()),
                    ..UpdateAccountInput::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn updating_the_active_account_refreshes_the_session() {
        let store = open_store().await;
        let active = store
            .authenticate(credentials("charlie.user@boardhub.dev", "user123"))
            .await
            .unwrap();

        store
            .update_account(
                active.id,
                UpdateAccountInput {
                    role: Some(Role::Admin),
                    ..UpdateAccountInput::default()
                },
            )
            .await
            .unwrap();

        assert!(store.is_privileged().await);
    }

    #[tokio::test]
    async fn deleting_the_active_account_clears_the_session() {
        let store = open_store().await;
        let active = store
            .authenticate(credentials("diane.user@boardhub.dev", "user123"))
            .await
            .unwrap();

        store.delete_account(active.id).await.unwrap();

        assert_eq!(store.current_account().await, None);
        assert_eq!(store.session_token().await, None);
        assert_eq!(store.list_accounts().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_unknown_account_fails_and_changes_nothing() {
        let store = open_store().await;

        let err = store.delete_account(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(store.list_accounts().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn session_survives_reopening_the_store() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        let store = AccountStore::open(Arc::clone(&backend), Duration::ZERO)
            .await
            .unwrap();
        let active = store
            .authenticate(credentials("alice.admin@boardhub.dev", "admin123"))
            .await
            .unwrap();
        drop(store);

        let reopened = AccountStore::open(backend, Duration::ZERO).await.unwrap();
        assert_eq!(reopened.current_account().await, Some(active));
        assert!(reopened.is_privileged().await);
    }

    #[tokio::test]
    async fn end_session_clears_memory_and_storage() {
        let backend: Arc<dyn KvBackend> = Arc::new(MemoryBackend::new());
        let store = AccountStore::open(Arc::clone(&backend), Duration::ZERO)
            .await
            .unwrap();
        store
            .authenticate(credentials("bob.admin@boardhub.dev", "admin123"))
            .await
            .unwrap();

        store.end_session().await.unwrap();

        assert_eq!(store.current_account().await, None);
        assert_eq!(backend.get(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_token_is_bound_to_the_active_account() {
        let store = open_store().await;
        assert_eq!(store.session_token().await, None);

        let active = store
            .authenticate(credentials("charlie.user@boardhub.dev", "user123"))
            .await
            .unwrap();

        assert_eq!(
            store.session_token().await,
            Some(format!("mock-token-{}", active.id))
        );
    }
}
