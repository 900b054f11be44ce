//! Notification Service
//!
//! Read side of poem notifications. Notifications themselves are written by
//! the like, comment and collection services.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    NotificationRepository, NotificationType, PoemNotification, PoemRepository,
    TransactionContext, UnitOfWork,
};
use crate::shared::error::AppError;

/// Title shown when the poem a notification refers to has been deleted.
pub const UNKNOWN_POEM_TITLE: &str = "Unknown Poem";

/// Notification service trait
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// A user's notifications, newest first
    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<NotificationDto>, NotificationError>;

    /// Mark one notification read
    async fn mark_as_read(&self, notification_id: i64, user_id: Uuid) -> Result<(), NotificationError>;

    /// Mark every notification read. Returns how many changed.
    async fn mark_all_as_read(&self, user_id: Uuid) -> Result<u64, NotificationError>;

    /// Number of unread notifications
    async fn unread_count(&self, user_id: Uuid) -> Result<i64, NotificationError>;
}

/// Notification data transfer object
#[derive(Debug, Clone)]
pub struct NotificationDto {
    pub id: i64,
    pub poem_id: i64,
    pub poem_title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationDto {
    fn new(notification: PoemNotification, poem_title: String) -> Self {
        Self {
            id: notification.id,
            poem_id: notification.poem_id,
            poem_title,
            message: notification.message,
            notification_type: notification.notification_type,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => AppError::NotFound(err.to_string()),
            NotificationError::Repository(e) => e,
        }
    }
}

/// NotificationService implementation
pub struct NotificationServiceImpl<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> NotificationServiceImpl<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationServiceImpl<U> {
    async fn get_user_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<NotificationDto>, NotificationError> {
        let mut tx = self.uow.begin().await?;

        let notifications = tx.find_notifications_by_user(user_id, unread_only).await?;

        let mut poem_ids: Vec<i64> = notifications.iter().map(|n| n.poem_id).collect();
        poem_ids.sort_unstable();
        poem_ids.dedup();

        let titles: HashMap<i64, String> = tx
            .find_poems_by_ids(&poem_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.title))
            .collect();

        tx.commit().await?;

        Ok(notifications
            .into_iter()
            .map(|n| {
                let title = titles
                    .get(&n.poem_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_POEM_TITLE.to_string());
                NotificationDto::new(n, title)
            })
            .collect())
    }

    async fn mark_as_read(&self, notification_id: i64, user_id: Uuid) -> Result<(), NotificationError> {
        let mut tx = self.uow.begin().await?;
        if !tx.mark_notification_read(notification_id, user_id).await? {
            return Err(NotificationError::NotFound);
        }
        tx.commit().await?;
        debug!(notification_id, "Notification marked read");
        Ok(())
    }

    async fn mark_all_as_read(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        let mut tx = self.uow.begin().await?;
        let changed = tx.mark_all_notifications_read(user_id).await?;
        tx.commit().await?;
        debug!(user_id = %user_id, changed, "Notifications marked read");
        Ok(changed)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, NotificationError> {
        let mut tx = self.uow.begin().await?;
        let count = tx.count_unread_notifications(user_id).await?;
        tx.commit().await?;
        Ok(count)
    }
}
