//! # Domain Layer
//!
//! The domain layer contains the core business types of the poetry platform.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Poems, comments, likes, collections, notifications, tags
//! - **unit_of_work**: Transaction contracts implemented by the storage backends
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate small pieces of domain behavior

pub mod entities;
pub mod unit_of_work;

// Re-export commonly used types
pub use entities::*;
pub use unit_of_work::{TransactionContext, UnitOfWork};
