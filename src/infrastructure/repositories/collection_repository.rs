//! Collection Repository Implementation
//!
//! PostgreSQL implementation of collections and their saved-poem rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Collection, CollectionRepository, SavedPoem};
use crate::infrastructure::database::PgTransactionContext;
use crate::shared::error::AppError;

/// Internal row type for collection queries.
#[derive(Debug, sqlx::FromRow)]
struct CollectionRow {
    id: i64,
    name: String,
    description: Option<String>,
    user_id: Uuid,
    is_public: bool,
    published_poem_count: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Collection {
            id: row.id,
            name: row.name,
            description: row.description,
            user_id: row.user_id,
            is_public: row.is_public,
            published_poem_count: row.published_poem_count,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SavedPoemRow {
    collection_id: i64,
    poem_id: i64,
    saved_at: DateTime<Utc>,
}

impl From<SavedPoemRow> for SavedPoem {
    fn from(row: SavedPoemRow) -> Self {
        SavedPoem {
            collection_id: row.collection_id,
            poem_id: row.poem_id,
            saved_at: row.saved_at,
        }
    }
}

#[async_trait]
impl CollectionRepository for PgTransactionContext {
    async fn find_collection(&mut self, id: i64) -> Result<Option<Collection>, AppError> {
        let row = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT id, name, description, user_id, is_public, published_poem_count,
                   is_deleted, created_at
            FROM collections
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .fetch_optional(self.conn())
        .await?;

        Ok(row.map(Collection::from))
    }

    async fn find_collections_by_user(&mut self, user_id: Uuid) -> Result<Vec<Collection>, AppError> {
        let rows = sqlx::query_as::<_, CollectionRow>(
            r#"
            SELECT id, name, description, user_id, is_public, published_poem_count,
                   is_deleted, created_at
            FROM collections
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn())
        .await?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    async fn insert_collection(&mut self, collection: &Collection) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO collections (id, name, description, user_id, is_public,
                                     published_poem_count, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(collection.id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(collection.user_id)
        .bind(collection.is_public)
        .bind(collection.published_poem_count)
        .bind(collection.is_deleted)
        .bind(collection.created_at)
        .execute(self.conn())
        .await?;

        Ok(())
    }

    async fn soft_delete_collection(&mut self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE collections SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(self.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn adjust_published_poem_count(&mut self, id: i64, delta: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE collections
            SET published_poem_count = GREATEST(published_poem_count + $2, 0)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(self.conn())
        .await?;

        Ok(())
    }

    async fn find_saved_poems(&mut self, collection_id: i64) -> Result<Vec<SavedPoem>, AppError> {
        let rows = sqlx::query_as::<_, SavedPoemRow>(
            r#"
            SELECT collection_id, poem_id, saved_at
            FROM saved_poems
            WHERE collection_id = $1
            ORDER BY saved_at DESC, poem_id DESC
            "#,
        )
        .bind(collection_id)
        .fetch_all(self.conn())
        .await?;

        Ok(rows.into_iter().map(SavedPoem::from).collect())
    }

    async fn saved_poem_exists(&mut self, collection_id: i64, poem_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM saved_poems
                WHERE collection_id = $1 AND poem_id = $2
            )
            "#,
        )
        .bind(collection_id)
        .bind(poem_id)
        .fetch_one(self.conn())
        .await?;

        Ok(exists)
    }

    async fn insert_saved_poem(&mut self, saved: &SavedPoem) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO saved_poems (collection_id, poem_id, saved_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(saved.collection_id)
        .bind(saved.poem_id)
        .bind(saved.saved_at)
        .execute(self.conn())
        .await?;

        Ok(())
    }

    async fn delete_saved_poem(&mut self, collection_id: i64, poem_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM saved_poems WHERE collection_id = $1 AND poem_id = $2",
        )
        .bind(collection_id)
        .bind(poem_id)
        .execute(self.conn())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_collections_containing_poem(&mut self, poem_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT c.id
            FROM saved_poems sp
            INNER JOIN collections c ON c.id = sp.collection_id
            WHERE sp.poem_id = $1 AND NOT c.is_deleted
            "#,
        )
        .bind(poem_id)
        .fetch_all(self.conn())
        .await?;

        Ok(ids)
    }
}
