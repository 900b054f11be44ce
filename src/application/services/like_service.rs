//! Like Service
//!
//! Handles likes on poems. A user likes a poem at most once; liking again is
//! a no-op.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::Actor;
use crate::domain::{
    Like, LikeRepository, NotificationRepository, NotificationType, PoemNotification,
    PoemRepository, StatisticsDelta, TransactionContext, UnitOfWork,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Like service trait
#[async_trait]
pub trait LikeService: Send + Sync {
    /// Like a poem. Returns false if the user had already liked it.
    async fn like(&self, poem_id: i64, actor: &Actor) -> Result<bool, LikeError>;

    /// Remove a like. Returns false if there was none.
    async fn unlike(&self, poem_id: i64, user_id: Uuid) -> Result<bool, LikeError>;

    /// Check whether a user likes a poem
    async fn is_liked_by_user(&self, poem_id: i64, user_id: Uuid) -> Result<bool, LikeError>;
}

/// Like service errors
#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("Poem not found")]
    PoemNotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<LikeError> for AppError {
    fn from(err: LikeError) -> Self {
        match err {
            LikeError::PoemNotFound => AppError::NotFound(err.to_string()),
            LikeError::Repository(e) => e,
        }
    }
}

/// LikeService implementation
pub struct LikeServiceImpl<U: UnitOfWork> {
    uow: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U: UnitOfWork> LikeServiceImpl<U> {
    pub fn new(uow: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { uow, id_generator }
    }
}

#[async_trait]
impl<U: UnitOfWork> LikeService for LikeServiceImpl<U> {
    async fn like(&self, poem_id: i64, actor: &Actor) -> Result<bool, LikeError> {
        let mut tx = self.uow.begin().await?;

        let poem = tx
            .find_poem(poem_id)
            .await?
            .filter(|p| p.is_visible_to(Some(actor.id)))
            .ok_or(LikeError::PoemNotFound)?;

        if tx.like_exists(poem_id, actor.id).await? {
            debug!(poem_id, user_id = %actor.id, "Poem already liked");
            return Ok(false);
        }

        // A concurrent like may have landed since the check
        if !tx.insert_like(&Like::new(self.id_generator.generate(), poem_id, actor.id)).await? {
            return Ok(false);
        }
        tx.adjust_poem_statistics(poem_id, StatisticsDelta::likes(1)).await?;

        let notify = !poem.is_authored_by(actor.id);
        if notify {
            let kind = NotificationType::NewLike;
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

        metrics::record_engagement("like");
        if notify {
            metrics::record_notification(NotificationType::NewLike.as_str());
        }
        info!(poem_id, user_id = %actor.id, "Poem liked");

        Ok(true)
    }

    async fn unlike(&self, poem_id: i64, user_id: Uuid) -> Result<bool, LikeError> {
        let mut tx = self.uow.begin().await?;

        if !tx.delete_like(poem_id, user_id).await? {
            return Ok(false);
        }
        tx.adjust_poem_statistics(poem_id, StatisticsDelta::likes(-1)).await?;

        tx.commit().await?;

        metrics::record_engagement("unlike");
        info!(poem_id, user_id = %user_id, "Poem unliked");
        Ok(true)
    }

    async fn is_liked_by_user(&self, poem_id: i64, user_id: Uuid) -> Result<bool, LikeError> {
        let mut tx = self.uow.begin().await?;
        let liked = tx.like_exists(poem_id, user_id).await?;
        tx.commit().await?;
        Ok(liked)
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
    async fn test_like_is_idempotent() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let poem_id = seed_poem(&uow, &ids, &author, "Moon", true).await;
        let service = LikeServiceImpl::new(uow.clone(), ids);

        assert!(service.like(poem_id, &reader).await.unwrap());
        assert!(!service.like(poem_id, &reader).await.unwrap());

        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.like_count, 1);
        assert_eq!(notifications_of(&uow, author.id).await.len(), 1);
        assert!(service.is_liked_by_user(poem_id, reader.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unlike_without_like_returns_false() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let poem_id = seed_poem(&uow, &ids, &author, "Moon", true).await;
        let service = LikeServiceImpl::new(uow.clone(), ids);

        service.like(poem_id, &author).await.unwrap();
        assert!(!service.unlike(poem_id, reader.id).await.unwrap());
        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.like_count, 1);
    }

    #[tokio::test]
    async fn test_like_then_unlike_scenario() {
        let (uow, ids) = store();
        let author = actor("alice");
        let reader = actor("bob");
        let poem_id = seed_poem(&uow, &ids, &author, "Moon", true).await;
        let service = LikeServiceImpl::new(uow.clone(), ids);

        service.like(poem_id, &reader).await.unwrap();
        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.like_count, 1);

        let notifications = notifications_of(&uow, author.id).await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notification_type, NotificationType::NewLike);
        assert!(notifications[0].message.contains("bob"));
        assert!(notifications[0].message.contains("Moon"));

        assert!(service.unlike(poem_id, reader.id).await.unwrap());
        assert_eq!(load_poem(&uow, poem_id).await.unwrap().statistics.like_count, 0);
        assert_eq!(notifications_of(&uow, author.id).await.len(), 1);
        assert!(!service.is_liked_by_user(poem_id, reader.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_like_does_not_notify() {
        let (uow, ids) = store();
        let author = actor("alice");
        let poem_id = seed_poem(&uow, &ids, &author, "Moon", true).await;
        let service = LikeServiceImpl::new(uow.clone(), ids);

        assert!(service.like(poem_id, &author).await.unwrap());
        assert!(notifications_of(&uow, author.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_like_missing_poem() {
        let (uow, ids) = store();
        let service = LikeServiceImpl::new(uow, ids);

        assert!(matches!(
            service.like(7, &actor("bob")).await,
            Err(LikeError::PoemNotFound)
        ));
    }
}
