//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits.
//!
//! Every trait is implemented directly on [`PgTransactionContext`], so all
//! reads and writes of one operation share a single database transaction.
//! The modules only contribute trait impls; nothing is re-exported.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use poetry_server::domain::{PoemRepository, TransactionContext, UnitOfWork};
//! use poetry_server::infrastructure::database::PgUnitOfWork;
//!
//! async fn bump_views(uow: &PgUnitOfWork, poem_id: i64) -> Result<(), AppError> {
//!     let mut tx = uow.begin().await?;
//!     tx.adjust_poem_statistics(poem_id, StatisticsDelta::views(1)).await?;
//!     tx.commit().await
//! }
//! ```
//!
//! [`PgTransactionContext`]: crate::infrastructure::database::PgTransactionContext

pub mod collection_repository;
pub mod comment_repository;
pub mod like_repository;
pub mod notification_repository;
pub mod poem_repository;
pub mod taxonomy_repository;
