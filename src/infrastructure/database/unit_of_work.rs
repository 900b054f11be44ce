//! Unit of Work Pattern Implementation
//!
//! Provides transactional boundaries for database operations.
//! Ensures all operations within a business transaction succeed or fail together.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::domain::{TransactionContext, UnitOfWork};
use crate::shared::error::AppError;

/// Transaction context that wraps a SQLx transaction.
///
/// The repository traits are implemented for this type in
/// `infrastructure::repositories`; every query runs on the wrapped
/// transaction.
pub struct PgTransactionContext {
    tx: Transaction<'static, Postgres>,
}

impl PgTransactionContext {
    /// Create a new transaction context.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Connection to run queries on.
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }
}

#[async_trait]
impl TransactionContext for PgTransactionContext {
    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(AppError::Database)
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.tx.rollback().await.map_err(AppError::Database)
    }
}

/// PostgreSQL Unit of Work implementation.
#[derive(Clone)]
pub struct PgUnitOfWork {
    pool: PgPool,
}

impl PgUnitOfWork {
    /// Create from a PgPool directly.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    type Context = PgTransactionContext;

    async fn begin(&self) -> Result<Self::Context, AppError> {
        let tx = self.pool.begin().await.map_err(AppError::Database)?;
        Ok(PgTransactionContext::new(tx))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
