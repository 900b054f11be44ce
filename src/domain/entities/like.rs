//! Like entity and repository trait.
//!
//! Maps to the `likes` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user's like on a poem.
///
/// Maps to the `likes` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - poem_id: BIGINT NOT NULL REFERENCES poems(id) ON DELETE CASCADE
/// - user_id: UUID NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
///
/// A unique index on (poem_id, user_id) backs the one-like-per-user rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub poem_id: i64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(id: i64, poem_id: i64, user_id: Uuid) -> Self {
        Self {
            id,
            poem_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for Like data access operations.
#[async_trait]
pub trait LikeRepository: Send {
    /// Check if a user has liked a poem.
    async fn like_exists(&mut self, poem_id: i64, user_id: Uuid) -> Result<bool, AppError>;

    /// Insert a like. Returns false if the pair already existed.
    async fn insert_like(&mut self, like: &Like) -> Result<bool, AppError>;

    /// Remove a like. Returns false if none existed.
    async fn delete_like(&mut self, poem_id: i64, user_id: Uuid) -> Result<bool, AppError>;
}
