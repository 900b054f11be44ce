//! Comment Repository Implementation
//!
//! PostgreSQL implementation of comment storage with soft deletes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, CommentRepository};
use crate::infrastructure::database::PgTransactionContext;
use crate::shared::error::AppError;
use crate::shared::pagination::PageRequest;

/// Internal row type for comment queries.
#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    poem_id: i64,
    user_id: Uuid,
    user_name: String,
    text: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            poem_id: row.poem_id,
            user_id: row.user_id,
            user_name: row.user_name,
            text: row.text,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PgTransactionContext {
    async fn find_comment(&mut self, id: i64) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, poem_id, user_id, user_name, text, is_deleted, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.conn())
        .await?;

        Ok(row.map(Comment::from))
    }

    async fn find_comments_by_poem(&mut self, poem_id: i64) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, poem_id, user_id, user_name, text, is_deleted, created_at
            FROM comments
            WHERE poem_id = $1 AND NOT is_deleted
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(poem_id)
        .fetch_all(self.conn())
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// One joined query instead of a per-poem fan-out.
    async fn find_comments_on_author_poems(
        &mut self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM comments c
            INNER JOIN poems p ON p.id = c.poem_id
            WHERE p.author_id = $1 AND NOT c.is_deleted
            "#,
        )
        .bind(author_id)
        .fetch_one(self.conn())
        .await?;

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.poem_id, c.user_id, c.user_name, c.text, c.is_deleted, c.created_at
            FROM comments c
            INNER JOIN poems p ON p.id = c.poem_id
            WHERE p.author_id = $1 AND NOT c.is_deleted
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.conn())
        .await?;

        Ok((rows.into_iter().map(Comment::from).collect(), total))
    }

    async fn insert_comment(&mut self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, poem_id, user_id, user_name, text, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id)
        .bind(comment.poem_id)
        .bind(comment.user_id)
        .bind(&comment.user_name)
        .bind(&comment.text)
        .bind(comment.is_deleted)
        .bind(comment.created_at)
        .execute(self.conn())
        .await?;

        Ok(())
    }

    async fn soft_delete_comment(&mut self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE comments SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(self.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rename_commenter(&mut self, user_id: Uuid, user_name: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE comments SET user_name = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(user_name)
            .execute(self.conn())
            .await?;

        Ok(result.rows_affected())
    }
}
