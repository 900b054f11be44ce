//! Poem notification entity and repository trait.
//!
//! Maps to the `poem_notifications` table. Notifications move one way,
//! from unread to read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Notification kinds, stored as text in `poem_notifications.notification_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    NewLike,
    NewComment,
    PoemSaved,
}

impl NotificationType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new_like" => Some(Self::NewLike),
            "new_comment" => Some(Self::NewComment),
            "poem_saved" => Some(Self::PoemSaved),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewLike => "new_like",
            Self::NewComment => "new_comment",
            Self::PoemSaved => "poem_saved",
        }
    }

    /// Human-readable message shown to the poem's author.
    pub fn message(&self, actor_name: &str, poem_title: &str) -> String {
        match self {
            Self::NewLike => format!("{} liked your poem \"{}\"", actor_name, poem_title),
            Self::NewComment => {
                format!("{} commented on your poem \"{}\"", actor_name, poem_title)
            }
            Self::PoemSaved => format!(
                "{} saved your poem \"{}\" to a collection",
                actor_name, poem_title
            ),
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification delivered to a poem's author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemNotification {
    pub id: i64,
    /// Recipient
    pub user_id: Uuid,
    pub poem_id: i64,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl PoemNotification {
    pub fn new(
        id: i64,
        user_id: Uuid,
        poem_id: i64,
        notification_type: NotificationType,
        message: String,
    ) -> Self {
        Self {
            id,
            user_id,
            poem_id,
            message,
            notification_type,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for notification data access operations.
#[async_trait]
pub trait NotificationRepository: Send {
    async fn insert_notification(&mut self, notification: &PoemNotification) -> Result<(), AppError>;

    /// A user's notifications, newest first.
    async fn find_notifications_by_user(
        &mut self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<PoemNotification>, AppError>;

    /// Mark one notification read. Returns false if it does not belong to the user.
    async fn mark_notification_read(&mut self, id: i64, user_id: Uuid) -> Result<bool, AppError>;

    /// Mark every unread notification of a user read. Returns rows changed.
    async fn mark_all_notifications_read(&mut self, user_id: Uuid) -> Result<u64, AppError>;

    async fn count_unread_notifications(&mut self, user_id: Uuid) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip_strings() {
        for kind in [
            NotificationType::NewLike,
            NotificationType::NewComment,
            NotificationType::PoemSaved,
        ] {
            assert_eq!(NotificationType::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationType::from_str("bogus"), None);
    }

    #[test]
    fn test_message_names_actor_and_poem() {
        let msg = NotificationType::NewLike.message("bob", "Ode to Rust");
        assert!(msg.contains("bob"));
        assert!(msg.contains("Ode to Rust"));
    }
}
