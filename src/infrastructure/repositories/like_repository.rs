//! Like Repository Implementation
//!
//! PostgreSQL implementation of poem likes. The unique index on
//! (poem_id, user_id) keeps inserts idempotent under concurrent requests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Like, LikeRepository};
use crate::infrastructure::database::PgTransactionContext;
use crate::shared::error::AppError;

#[async_trait]
impl LikeRepository for PgTransactionContext {
    /// Efficient single-row check using EXISTS.
    async fn like_exists(&mut self, poem_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE poem_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(poem_id)
        .bind(user_id)
        .fetch_one(self.conn())
        .await?;

        Ok(exists)
    }

    /// Uses INSERT ON CONFLICT so a racing duplicate reports `false`
    /// instead of failing.
    async fn insert_like(&mut self, like: &Like) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO likes (id, poem_id, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (poem_id, user_id) DO NOTHING
            "#,
        )
        .bind(like.id)
        .bind(like.poem_id)
        .bind(like.user_id)
        .bind(like.created_at)
        .execute(self.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&mut self, poem_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM likes WHERE poem_id = $1 AND user_id = $2")
            .bind(poem_id)
            .bind(user_id)
            .execute(self.conn())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
