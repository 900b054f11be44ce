//! Notification Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NotificationRepository, NotificationType, PoemNotification};
use crate::infrastructure::database::PgTransactionContext;
use crate::shared::error::AppError;

/// Internal row type for notification queries.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: Uuid,
    poem_id: i64,
    message: String,
    notification_type: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for PoemNotification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let notification_type = NotificationType::from_str(&row.notification_type)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Unknown notification type '{}' on notification {}",
                    row.notification_type, row.id
                ))
            })?;

        Ok(PoemNotification {
            id: row.id,
            user_id: row.user_id,
            poem_id: row.poem_id,
            message: row.message,
            notification_type,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl NotificationRepository for PgTransactionContext {
    async fn insert_notification(&mut self, notification: &PoemNotification) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO poem_notifications (id, user_id, poem_id, message,
                                            notification_type, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.poem_id)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(self.conn())
        .await?;

        Ok(())
    }

    async fn find_notifications_by_user(
        &mut self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<PoemNotification>, AppError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, poem_id, message, notification_type, is_read, created_at
            FROM poem_notifications
            WHERE user_id = $1 AND ($2 = FALSE OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(self.conn())
        .await?;

        rows.into_iter().map(PoemNotification::try_from).collect()
    }

    async fn mark_notification_read(&mut self, id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE poem_notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&mut self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE poem_notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(self.conn())
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread_notifications(&mut self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM poem_notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(self.conn())
        .await?;

        Ok(count)
    }
}
