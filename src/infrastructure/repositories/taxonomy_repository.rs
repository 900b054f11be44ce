//! Tag and Category Repository Implementations
//!
//! Get-or-create against the case-insensitive unique indexes on
//! `LOWER(name)`. The insert is a no-op when a row with the same name in any
//! casing already exists; the follow-up select returns whichever row won.

use async_trait::async_trait;

use crate::domain::{Category, CategoryRepository, Tag, TagRepository};
use crate::infrastructure::database::PgTransactionContext;
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct NamedRow {
    id: i64,
    name: String,
}

#[async_trait]
impl TagRepository for PgTransactionContext {
    async fn get_or_create_tag(&mut self, name: &str, new_id: i64) -> Result<Tag, AppError> {
        let name = name.trim();

        sqlx::query(
            r#"
            INSERT INTO tags (id, name)
            VALUES ($1, $2)
            ON CONFLICT ((LOWER(name))) DO NOTHING
            "#,
        )
        .bind(new_id)
        .bind(name)
        .execute(self.conn())
        .await?;

        let row = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name FROM tags WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_one(self.conn())
        .await?;

        Ok(Tag { id: row.id, name: row.name })
    }
}

#[async_trait]
impl CategoryRepository for PgTransactionContext {
    async fn get_or_create_category(&mut self, name: &str, new_id: i64) -> Result<Category, AppError> {
        let name = name.trim();

        sqlx::query(
            r#"
            INSERT INTO categories (id, name)
            VALUES ($1, $2)
            ON CONFLICT ((LOWER(name))) DO NOTHING
            "#,
        )
        .bind(new_id)
        .bind(name)
        .execute(self.conn())
        .await?;

        let row = sqlx::query_as::<_, NamedRow>(
            "SELECT id, name FROM categories WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_one(self.conn())
        .await?;

        Ok(Category { id: row.id, name: row.name })
    }
}
