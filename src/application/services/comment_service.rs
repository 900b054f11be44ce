//! Comment Service
//!
//! Handles comments on poems. Adding or removing a comment keeps the poem's
//! `comment_count` in step, and a new comment notifies the poem's author.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::Actor;
use crate::domain::{
    Comment, CommentRepository, NotificationRepository, NotificationType, PoemNotification,
    PoemRepository, StatisticsDelta, TransactionContext, UnitOfWork,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::pagination::{PageRequest, PagedResult};
use crate::shared::snowflake::SnowflakeGenerator;

/// Maximum comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Comment service trait
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Add a comment to a poem
    async fn add_comment(&self, poem_id: i64, actor: &Actor, text: String) -> Result<CommentDto, CommentError>;

    /// Soft delete a comment
    async fn delete_comment(&self, comment_id: i64, caller: Uuid) -> Result<(), CommentError>;

    /// Live comments on a poem, newest first
    async fn get_comments(&self, poem_id: i64, viewer: Option<Uuid>) -> Result<Vec<CommentDto>, CommentError>;

    /// Live comments on any of an author's poems, newest first
    async fn get_comments_by_author_poems(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<PagedResult<CommentDto>, CommentError>;
}

/// Comment data transfer object
#[derive(Debug, Clone)]
pub struct CommentDto {
    pub id: i64,
    pub poem_id: i64,
    /// Set when listing comments across several poems
    pub poem_title: Option<String>,
    pub user_id: Uuid,
    pub user_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            poem_id: comment.poem_id,
            poem_title: None,
            user_id: comment.user_id,
            user_name: comment.user_name,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

/// Comment service errors
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Poem not found")]
    PoemNotFound,

    #[error("Comment not found")]
    NotFound,

    #[error("Only the comment author or the poem author can delete this comment")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CommentError> for AppError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::PoemNotFound | CommentError::NotFound => AppError::NotFound(err.to_string()),
            CommentError::Forbidden => AppError::Forbidden(err.to_string()),
            CommentError::Validation(msg) => AppError::Validation(msg),
            CommentError::Repository(e) => e,
        }
    }
}

/// CommentService implementation
pub struct CommentServiceImpl<U: UnitOfWork> {
    uow: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U: UnitOfWork> CommentServiceImpl<U> {
    pub fn new(uow: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { uow, id_generator }
    }
}

#[async_trait]
impl<U: UnitOfWork> CommentService for CommentServiceImpl<U> {
    async fn add_comment(&self, poem_id: i64, actor: &Actor, text: String) -> Result<CommentDto, CommentError> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CommentError::Validation("Comment text is required".into()));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(CommentError::Validation(format!(
                "Comment must be at most {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let mut tx = self.uow.begin().await?;

        let poem = tx
            .find_poem(poem_id)
            .await?
            .filter(|p| p.is_visible_to(Some(actor.id)))
            .ok_or(CommentError::PoemNotFound)?;

        let comment = Comment::new(
            self.id_generator.generate(),
            poem_id,
            actor.id,
            actor.name.clone(),
            text,
        );
        tx.insert_comment(&comment).await?;
        tx.adjust_poem_statistics(poem_id, StatisticsDelta::comments(1)).await?;

        let notify = !poem.is_authored_by(actor.id);
        if notify {
            let kind = NotificationType::NewComment;
            let notification = PoemNotification::new(
                self.id_generator.generate(),
                poem.author_id,
                poem_id,
                kind,
                kind.message(&actor.name, &poem.title),
            );
            tx.insert_notification(&notification).await?;
        }

        tx.commit().await?;

        metrics::record_engagement("comment");
        if notify {
            metrics::record_notification(NotificationType::NewComment.as_str());
        }
        info!(comment_id = comment.id, poem_id, user_id = %actor.id, "Comment added");

        Ok(CommentDto::from(comment))
    }

    async fn delete_comment(&self, comment_id: i64, caller: Uuid) -> Result<(), CommentError> {
        let mut tx = self.uow.begin().await?;

        let comment = tx
            .find_comment(comment_id)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or(CommentError::NotFound)?;

        let poem_author = tx.find_poem(comment.poem_id).await?.map(|p| p.author_id);
        if !comment.is_written_by(caller) && poem_author != Some(caller) {
            return Err(CommentError::Forbidden);
        }

        if tx.soft_delete_comment(comment_id).await? {
            tx.adjust_poem_statistics(comment.poem_id, StatisticsDelta::comments(-1))
                .await?;
        }

        tx.commit().await?;
        info!(comment_id, poem_id = comment.poem_id, "Comment deleted");
        Ok(())
    }

    async fn get_comments(&self, poem_id: i64, viewer: Option<Uuid>) -> Result<Vec<CommentDto>, CommentError> {
        let mut tx = self.uow.begin().await?;

        if !tx
            .find_poem(poem_id)
            .await?
            .is_some_and(|p| p.is_visible_to(viewer))
        {
            return Err(CommentError::PoemNotFound);
        }

        let comments = tx.find_comments_by_poem(poem_id).await?;
        tx.commit().await?;

        Ok(comments.into_iter().map(CommentDto::from).collect())
    }

    async fn get_comments_by_author_poems(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<PagedResult<CommentDto>, CommentError> {
        let mut tx = self.uow.begin().await?;

        let (comments, total) = tx.find_comments_on_author_poems(author_id, page).await?;

        let mut poem_ids: Vec<i64> = comments.iter().map(|c| c.poem_id).collect();
        poem_ids.sort_unstable();
        poem_ids.dedup();

        let titles: HashMap<i64, String> = tx
            .find_poems_by_ids(&poem_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.title))
            .collect();

        tx.commit().await?;

        let items = comments
            .into_iter()
            .map(|c| {
                let poem_title = titles.get(&c.poem_id).cloned();
                CommentDto { poem_title, ..CommentDto::from(c) }
            })
            .collect();

        Ok(PagedResult::new(items, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{
        actor, load_poem, notifications_of, seed_poem, store,
    };
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_comment_count_tracks_live_comments() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let poem_id = seed_poem(&uow, &ids, &author, "Rain", true).await;
        let service = CommentServiceImpl::new(uow.clone(), ids);

        let first = service.add_comment(poem_id, &reader, "lovely".into()).await.unwrap();
        service.add_comment(poem_id, &reader, "again".into()).await.unwrap();
        service.delete_comment(first.id, reader.id).await.unwrap();

        let poem = load_poem(&uow, poem_id).await.unwrap();
        assert_eq!(poem.statistics.comment_count, 1);
        assert_eq!(service.get_comments(poem_id, None).await.unwrap().len(), 1);

        // Deleting twice is NotFound and leaves the count alone
        assert!(matches!(
            service.delete_comment(first.id, reader.id).await,
            Err(CommentError::NotFound)
        ));
        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.comment_count, 1);
    }

    #[tokio::test]
    async fn test_comment_notifies_author() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let poem_id = seed_poem(&uow, &ids, &author, "Rain", true).await;
        let service = CommentServiceImpl::new(uow.clone(), ids);

        service.add_comment(poem_id, &reader, "lovely".into()).await.unwrap();

        let notifications = notifications_of(&uow, author.id).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, NotificationType::NewComment);
        assert!(notifications[0].message.contains("bob"));
        assert!(notifications[0].message.contains("Rain"));
    }

    #[tokio::test]
    async fn test_own_comment_does_not_notify() {
        let (uow, ids) = store();
        let author = actor("alice");
        let poem_id = seed_poem(&uow, &ids, &author, "Rain", true).await;
        let service = CommentServiceImpl::new(uow.clone(), ids);

        service.add_comment(poem_id, &author, "note to self".into()).await.unwrap();

        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.comment_count, 1);
        assert!(notifications_of(&uow, author.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_comment_authorization() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let stranger = actor("eve");
        let poem_id = seed_poem(&uow, &ids, &author, "Rain", true).await;
        let service = CommentServiceImpl::new(uow.clone(), ids);

        let by_reader = service.add_comment(poem_id, &reader, "one".into()).await.unwrap();
        let also_by_reader = service.add_comment(poem_id, &reader, "two".into()).await.unwrap();

        assert!(matches!(
            service.delete_comment(by_reader.id, stranger.id).await,
            Err(CommentError::Forbidden)
        ));
        service.delete_comment(by_reader.id, reader.id).await.unwrap();
        service.delete_comment(also_by_reader.id, author.id).await.unwrap();

        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.comment_count, 0);
    }

    #[tokio::test]
    async fn test_add_comment_to_missing_poem_writes_nothing() {
        let (uow, ids) = store();
        let service = CommentServiceImpl::new(uow.clone(), ids);
        let reader = actor("bob");

        assert!(matches!(
            service.add_comment(42, &reader, "hello".into()).await,
            Err(CommentError::PoemNotFound)
        ));
        assert!(matches!(
            service.add_comment(42, &reader, "   ".into()).await,
            Err(CommentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_comments_on_author_poems_carry_titles() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let rain = seed_poem(&uow, &ids, &author, "Rain", true).await;
        let snow = seed_poem(&uow, &ids, &author, "Snow", true).await;
        let other = seed_poem(&uow, &ids, &reader, "Elsewhere", true).await;
        let service = CommentServiceImpl::new(uow.clone(), ids);

        service.add_comment(rain, &reader, "wet".into()).await.unwrap();
        service.add_comment(snow, &reader, "cold".into()).await.unwrap();
        service.add_comment(other, &author, "nice".into()).await.unwrap();

        let page = service
            .get_comments_by_author_poems(author.id, PageRequest::new(Some(1), Some(1)))
            .await
            .unwrap();

        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].text, "cold");
        assert_eq!(page.items[0].poem_title.as_deref(), Some("Snow"));
    }
}
