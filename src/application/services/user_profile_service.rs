//! User Profile Service
//!
//! Keeps denormalized display names in step with the identity provider.
//! Poems carry `author_name` and comments carry `user_name`; when a user is
//! renamed both are rewritten in one transaction.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    CommentRepository, PoemRepository, TransactionContext, UnitOfWork, MAX_DISPLAY_NAME_LENGTH,
};
use crate::shared::error::AppError;

/// User profile service trait
#[async_trait]
pub trait UserProfileService: Send + Sync {
    /// Rewrite a user's name on their poems and comments.
    /// Returns the number of rows touched.
    async fn propagate_rename(&self, user_id: Uuid, new_name: &str) -> Result<u64, UserProfileError>;
}

/// User profile service errors
#[derive(Debug, thiserror::Error)]
pub enum UserProfileError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<UserProfileError> for AppError {
    fn from(err: UserProfileError) -> Self {
        match err {
            UserProfileError::Validation(msg) => AppError::Validation(msg),
            UserProfileError::Repository(e) => e,
        }
    }
}

/// UserProfileService implementation
pub struct UserProfileServiceImpl<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserProfileServiceImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserProfileService for UserProfileServiceImpl<U> {
    async fn propagate_rename(&self, user_id: Uuid, new_name: &str) -> Result<u64, UserProfileError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(UserProfileError::Validation("Name must not be empty".into()));
        }
        if new_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(UserProfileError::Validation(format!(
                "Name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
            )));
        }

        let mut tx = self.uow.begin().await?;
        let poems = tx.rename_poem_author(user_id, new_name).await?;
        let comments = tx.rename_commenter(user_id, new_name).await?;
        tx.commit().await?;

        info!(user_id = %user_id, poems, comments, "User rename propagated");
        Ok(poems + comments)
    }
}
