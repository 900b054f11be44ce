//! In-Memory Store
//!
//! A process-local implementation of the unit of work, used by the test
//! suites and by `database.backend = "memory"` for local development.
//!
//! Transactions are serialized: [`InMemoryUnitOfWork::begin`] takes an owned
//! lock on the shared state and works on a private copy. `commit` writes the
//! copy back; dropping the context discards it.

mod repositories;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    Category, Collection, Comment, Like, Poem, PoemNotification, SavedPoem, Tag,
    TransactionContext, UnitOfWork,
};
use crate::shared::error::AppError;

/// Every table of the schema, held in ordered maps keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    poems: BTreeMap<i64, Poem>,
    tags: BTreeMap<i64, Tag>,
    categories: BTreeMap<i64, Category>,
    comments: BTreeMap<i64, Comment>,
    likes: BTreeMap<i64, Like>,
    collections: BTreeMap<i64, Collection>,
    saved_poems: Vec<SavedPoem>,
    notifications: BTreeMap<i64, PoemNotification>,
}

/// In-memory [`UnitOfWork`].
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWork {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    type Context = MemoryTransactionContext;

    async fn begin(&self) -> Result<Self::Context, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTransactionContext { guard, working })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// A transaction over [`MemoryState`].
pub struct MemoryTransactionContext {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl TransactionContext for MemoryTransactionContext {
    async fn commit(self) -> Result<(), AppError> {
        let Self { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LikeRepository, PoemRepository};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded() {
        let uow = InMemoryUnitOfWork::new();
        let user = Uuid::new_v4();

        let mut tx = uow.begin().await.unwrap();
        assert!(tx.insert_like(&Like::new(1, 10, user)).await.unwrap());
        drop(tx);

        let mut tx = uow.begin().await.unwrap();
        assert!(!tx.like_exists(10, user).await.unwrap());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_committed_writes_are_visible() {
        let uow = InMemoryUnitOfWork::new();
        let user = Uuid::new_v4();

        let mut tx = uow.begin().await.unwrap();
        tx.insert_like(&Like::new(1, 10, user)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = uow.begin().await.unwrap();
        assert!(tx.like_exists(10, user).await.unwrap());
        assert!(tx.find_poem(10).await.unwrap().is_none());
    }
}
