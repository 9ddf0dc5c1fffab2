//! In-memory user store.
//!
//! Implements both [`TransactionSource`] and [`UserRepository`] over a shared
//! map. Inserts are staged per transaction and only become visible on commit.
//! A username staged by one open transaction cannot be staged by another.
//! Faults can be switched on to simulate outages, and every transaction
//! boundary is recorded so callers can assert commit/rollback behaviour.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sea_orm::DbErr;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::User;

use super::UserRepository;
use crate::infra::{HealthProbe, StorageTransaction, TransactionSource};

/// Failure switches for the in-memory store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    pub fail_begin: bool,
    pub fail_queries: bool,
    pub fail_commit: bool,
    pub fail_rollback: bool,
}

/// Transaction boundary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxEvent {
    Begin(u64),
    Commit(u64),
    Rollback(u64),
}

#[derive(Default)]
struct StoreState {
    users: HashMap<Uuid, User>,
    staged: HashMap<u64, Vec<User>>,
    next_tx: u64,
    faults: Faults,
    journal: Vec<TxEvent>,
}

impl StoreState {
    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|u| u.username == username)
    }
}

/// Shared in-memory store. Clones refer to the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_faults(&self, faults: Faults) {
        self.lock().faults = faults;
    }

    /// Transaction boundaries seen so far, in order.
    pub fn journal(&self) -> Vec<TxEvent> {
        self.lock().journal.clone()
    }

    /// Number of committed users.
    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transactions that were begun but not yet finished.
    pub fn open_transactions(&self) -> usize {
        self.lock().staged.len()
    }

    fn outage() -> DbErr {
        DbErr::Custom("storage unavailable".to_string())
    }
}

/// Transaction handle for [`InMemoryStore`].
pub struct MemoryTransaction {
    id: u64,
    store: InMemoryStore,
}

impl MemoryTransaction {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl TransactionSource for InMemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, DbErr> {
        let mut state = self.lock();
        if state.faults.fail_begin {
            return Err(Self::outage());
        }
        state.next_tx += 1;
        let id = state.next_tx;
        state.staged.insert(id, Vec::new());
        state.journal.push(TxEvent::Begin(id));
        Ok(MemoryTransaction {
            id,
            store: self.clone(),
        })
    }
}

#[async_trait]
impl StorageTransaction for MemoryTransaction {
    async fn commit(self) -> Result<(), DbErr> {
        let mut state = self.store.lock();
        state.journal.push(TxEvent::Commit(self.id));
        let staged = state.staged.remove(&self.id).unwrap_or_default();
        if state.faults.fail_commit {
            return Err(DbErr::Custom("commit failed".to_string()));
        }
        if let Some(dup) = staged.iter().find(|u| state.username_taken(&u.username)) {
            return Err(DbErr::Custom(format!(
                "UNIQUE constraint failed: users.username ({})",
                dup.username
            )));
        }
        for user in staged {
            state.users.insert(user.id, user);
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbErr> {
        let mut state = self.store.lock();
        state.journal.push(TxEvent::Rollback(self.id));
        state.staged.remove(&self.id);
        if state.faults.fail_rollback {
            return Err(DbErr::Custom("rollback failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    type Tx = MemoryTransaction;

    async fn create_tx(&self, tx: &MemoryTransaction, user: &User) -> AppResult<()> {
        let mut state = self.lock();
        if state.faults.fail_queries {
            return Err(AppError::Execution(Self::outage()));
        }
        if !state.staged.contains_key(&tx.id) {
            return Err(AppError::internal(format!("transaction {} is not open", tx.id)));
        }
        // A name staged by any open transaction is already reserved, as with
        // a unique index.
        let staged_anywhere = state
            .staged
            .values()
            .flatten()
            .any(|u| u.username == user.username);
        if staged_anywhere || state.username_taken(&user.username) {
            return Err(AppError::conflict("Username"));
        }
        if let Some(staged) = state.staged.get_mut(&tx.id) {
            staged.push(user.clone());
        }
        Ok(())
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        let state = self.lock();
        if state.faults.fail_queries {
            return Err(AppError::Execution(Self::outage()));
        }
        state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_not_found()
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        let state = self.lock();
        if state.faults.fail_queries {
            return Err(AppError::Execution(Self::outage()));
        }
        state.users.get(&id).cloned().ok_or_not_found()
    }
}

#[async_trait]
impl HealthProbe for InMemoryStore {
    async fn ping(&self) -> AppResult<()> {
        if self.lock().faults.fail_queries {
            return Err(AppError::Execution(Self::outage()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User::new(
            Uuid::new_v4(),
            "Test".to_string(),
            username.to_string(),
            None,
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_staged_rows_invisible_until_commit() {
        let store = InMemoryStore::new();
        let tx = store.begin().await.unwrap();
        let alice = user("alice");

        store.create_tx(&tx, &alice).await.unwrap();
        assert!(matches!(
            store.get_by_username("alice").await,
            Err(AppError::NotFound)
        ));

        tx.commit().await.unwrap();
        assert_eq!(store.get_by_id(alice.id).await.unwrap(), alice);
    }

    #[tokio::test]
    async fn test_rollback_discards_rows() {
        let store = InMemoryStore::new();
        let tx = store.begin().await.unwrap();
        store.create_tx(&tx, &user("alice")).await.unwrap();
        let id = tx.id();

        tx.rollback().await.unwrap();

        assert!(store.is_empty());
        assert_eq!(store.open_transactions(), 0);
        assert_eq!(store.journal(), vec![TxEvent::Begin(id), TxEvent::Rollback(id)]);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = InMemoryStore::new();
        let tx = store.begin().await.unwrap();
        store.create_tx(&tx, &user("alice")).await.unwrap();
        tx.commit().await.unwrap();

        let tx = store.begin().await.unwrap();
        let result = store.create_tx(&tx, &user("alice")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_username_staged_elsewhere_conflicts() {
        let store = InMemoryStore::new();
        let first = store.begin().await.unwrap();
        let second = store.begin().await.unwrap();

        store.create_tx(&first, &user("bob")).await.unwrap();
        let result = store.create_tx(&second, &user("bob")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        second.rollback().await.unwrap();
        first.commit().await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_outage_is_execution_error() {
        let store = InMemoryStore::new();
        store.set_faults(Faults {
            fail_queries: true,
            ..Faults::default()
        });

        assert!(store.get_by_username("alice").await.unwrap_err().is_execution());
        assert!(store.ping().await.is_err());
    }
}
