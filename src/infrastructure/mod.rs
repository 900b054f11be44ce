//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - An in-process store with the same transactional contract
//! - Prometheus metrics

pub mod database;
pub mod memory;
pub mod metrics;
pub mod repositories;
