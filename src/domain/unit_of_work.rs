//! Unit of Work contracts.
//!
//! A [`UnitOfWork`] hands out [`TransactionContext`]s. A context implements
//! every repository trait, so all reads and writes made through it belong to
//! one transaction. Nothing is persisted until [`TransactionContext::commit`]
//! is called; dropping a context without committing rolls it back.

use async_trait::async_trait;

use super::entities::{
    CategoryRepository, CollectionRepository, CommentRepository, LikeRepository,
    NotificationRepository, PoemRepository, TagRepository,
};
use crate::shared::error::AppError;

/// A single transaction spanning every repository.
#[async_trait]
pub trait TransactionContext:
    PoemRepository
    + TagRepository
    + CategoryRepository
    + CommentRepository
    + LikeRepository
    + CollectionRepository
    + NotificationRepository
    + Send
    + Sized
{
    /// Commit the transaction.
    async fn commit(self) -> Result<(), AppError>;

    /// Rollback the transaction.
    async fn rollback(self) -> Result<(), AppError>;
}

/// Unit of Work trait for managing database transactions.
///
/// This pattern ensures that multiple repository operations can be
/// grouped into a single atomic transaction.
#[async_trait]
pub trait UnitOfWork: Send + Sync + 'static {
    type Context: TransactionContext + 'static;

    /// Begin a new transaction.
    async fn begin(&self) -> Result<Self::Context, AppError>;

    /// Cheap connectivity check used by readiness probes.
    async fn ping(&self) -> Result<(), AppError>;
}
