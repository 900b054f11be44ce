//! Comment entity and repository trait.
//!
//! Maps to the `comments` table. Comments are soft-deleted and never removed
//! while their poem exists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;
use crate::shared::pagination::PageRequest;

/// Represents a comment on a poem.
///
/// Maps to the `comments` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - poem_id: BIGINT NOT NULL REFERENCES poems(id) ON DELETE CASCADE
/// - user_id: UUID NOT NULL
/// - user_name: VARCHAR(100) NOT NULL (denormalized)
/// - text: TEXT NOT NULL
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub poem_id: i64,
    pub user_id: Uuid,
    pub user_name: String,
    pub text: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: i64, poem_id: i64, user_id: Uuid, user_name: String, text: String) -> Self {
        Self {
            id,
            poem_id,
            user_id,
            user_name,
            text,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_written_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Repository trait for Comment data access operations.
#[async_trait]
pub trait CommentRepository: Send {
    /// Find a comment by id, including soft-deleted ones.
    async fn find_comment(&mut self, id: i64) -> Result<Option<Comment>, AppError>;

    /// Live comments on a poem, newest first.
    async fn find_comments_by_poem(&mut self, poem_id: i64) -> Result<Vec<Comment>, AppError>;

    /// Live comments on any poem written by `author_id`, newest first,
    /// paginated. Returns the page and the total count.
    async fn find_comments_on_author_poems(
        &mut self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, i64), AppError>;

    /// Insert a new comment.
    async fn insert_comment(&mut self, comment: &Comment) -> Result<(), AppError>;

    /// Flag a live comment as deleted. Returns false if it was already gone.
    async fn soft_delete_comment(&mut self, id: i64) -> Result<bool, AppError>;

    /// Rewrite the denormalized commenter name on all of a user's comments.
    async fn rename_commenter(&mut self, user_id: Uuid, user_name: &str) -> Result<u64, AppError>;
}
