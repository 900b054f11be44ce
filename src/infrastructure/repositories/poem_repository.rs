//! Poem Repository Implementation
//!
//! PostgreSQL implementation of poem storage: filtered search with
//! pagination, tag/category link maintenance and atomic counter updates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::{
    Category, Poem, PoemQuery, PoemRepository, PoemStatistics, StatisticsDelta, Tag,
};
use crate::infrastructure::database::PgTransactionContext;
use crate::shared::error::AppError;

const POEM_COLUMNS: &str = r#"
    id, title, content, excerpt, author_id, author_name, is_published,
    view_count, like_count, comment_count, save_count, created_at, updated_at
"#;

/// Internal row type for poem queries.
#[derive(Debug, sqlx::FromRow)]
struct PoemRow {
    id: i64,
    title: String,
    content: String,
    excerpt: String,
    author_id: Uuid,
    author_name: String,
    is_published: bool,
    view_count: i64,
    like_count: i64,
    comment_count: i64,
    save_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PoemRow {
    /// Converts database row to domain Poem entity (links loaded separately).
    fn into_poem(self) -> Poem {
        Poem {
            id: self.id,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            author_id: self.author_id,
            author_name: self.author_name,
            is_published: self.is_published,
            statistics: PoemStatistics {
                view_count: self.view_count,
                like_count: self.like_count,
                comment_count: self.comment_count,
                save_count: self.save_count,
            },
            tags: Vec::new(),
            categories: Vec::new(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row type for tag and category link lookups.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    poem_id: i64,
    id: i64,
    name: String,
}

/// Escape LIKE wildcards in user input and wrap it for a substring match.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PoemQuery) {
    if let Some(author_id) = query.author_id {
        qb.push(" AND author_id = ").push_bind(author_id);
    }
    if let Some(is_published) = query.is_published {
        qb.push(" AND is_published = ").push_bind(is_published);
    }
    if let Some(term) = query
        .search_term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let pattern = like_pattern(term);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR author_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl PgTransactionContext {
    /// Attach tags and categories to freshly loaded rows, preserving row order.
    async fn hydrate(&mut self, rows: Vec<PoemRow>) -> Result<Vec<Poem>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let tag_rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT pt.poem_id, t.id, t.name
            FROM poem_tags pt
            INNER JOIN tags t ON t.id = pt.tag_id
            WHERE pt.poem_id = ANY($1)
            ORDER BY LOWER(t.name)
            "#,
        )
        .bind(&ids)
        .fetch_all(self.conn())
        .await?;

        let category_rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT pc.poem_id, c.id, c.name
            FROM poem_categories pc
            INNER JOIN categories c ON c.id = pc.category_id
            WHERE pc.poem_id = ANY($1)
            ORDER BY LOWER(c.name)
            "#,
        )
        .bind(&ids)
        .fetch_all(self.conn())
        .await?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.poem_id).or_default().push(Tag { id: row.id, name: row.name });
        }

        let mut categories: HashMap<i64, Vec<Category>> = HashMap::new();
        for row in category_rows {
            categories
                .entry(row.poem_id)
                .or_default()
                .push(Category { id: row.id, name: row.name });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut poem = row.into_poem();
                poem.tags = tags.remove(&poem.id).unwrap_or_default();
                poem.categories = categories.remove(&poem.id).unwrap_or_default();
                poem
            })
            .collect())
    }

    /// Replace the tag and category links of a poem.
    async fn write_links(&mut self, poem: &Poem, replace: bool) -> Result<(), AppError> {
        if replace {
            sqlx::query("DELETE FROM poem_tags WHERE poem_id = $1")
                .bind(poem.id)
                .execute(self.conn())
                .await?;
            sqlx::query("DELETE FROM poem_categories WHERE poem_id = $1")
                .bind(poem.id)
                .execute(self.conn())
                .await?;
        }

        let tag_ids: Vec<i64> = poem.tags.iter().map(|t| t.id).collect();
        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO poem_tags (poem_id, tag_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(poem.id)
            .bind(&tag_ids)
            .execute(self.conn())
            .await?;
        }

        let category_ids: Vec<i64> = poem.categories.iter().map(|c| c.id).collect();
        if !category_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO poem_categories (poem_id, category_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(poem.id)
            .bind(&category_ids)
            .execute(self.conn())
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl PoemRepository for PgTransactionContext {
    async fn find_poem(&mut self, id: i64) -> Result<Option<Poem>, AppError> {
        let row = sqlx::query_as::<_, PoemRow>(&format!(
            "SELECT {} FROM poems WHERE id = $1",
            POEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.conn())
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_poems_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Poem>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PoemRow>(&format!(
            "SELECT {} FROM poems WHERE id = ANY($1)",
            POEM_COLUMNS
        ))
        .bind(ids)
        .fetch_all(self.conn())
        .await?;

        self.hydrate(rows).await
    }

    async fn find_poems_by_author(
        &mut self,
        author_id: Uuid,
        include_unpublished: bool,
    ) -> Result<Vec<Poem>, AppError> {
        let rows = sqlx::query_as::<_, PoemRow>(&format!(
            r#"
            SELECT {}
            FROM poems
            WHERE author_id = $1 AND ($2 OR is_published)
            ORDER BY created_at DESC, id DESC
            "#,
            POEM_COLUMNS
        ))
        .bind(author_id)
        .bind(include_unpublished)
        .fetch_all(self.conn())
        .await?;

        self.hydrate(rows).await
    }

    /// Search with server-side filtering, ordering and pagination.
    ///
    /// Ties on the sort key are broken by id in the same direction so that
    /// pages are stable.
    async fn search_poems(&mut self, query: &PoemQuery) -> Result<(Vec<Poem>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM poems WHERE TRUE");
        push_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.conn())
            .await?;

        let direction = if query.descending { "DESC" } else { "ASC" };
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM poems WHERE TRUE",
            POEM_COLUMNS
        ));
        push_filters(&mut qb, query);
        qb.push(format!(
            " ORDER BY {} {}, id {}",
            query.sort_by.column(),
            direction,
            direction
        ));
        qb.push(" LIMIT ")
            .push_bind(query.page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let rows = qb
            .build_query_as::<PoemRow>()
            .fetch_all(self.conn())
            .await?;

        Ok((self.hydrate(rows).await?, total))
    }

    async fn insert_poem(&mut self, poem: &Poem) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO poems (
                id, title, content, excerpt, author_id, author_name, is_published,
                view_count, like_count, comment_count, save_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(poem.id)
        .bind(&poem.title)
        .bind(&poem.content)
        .bind(&poem.excerpt)
        .bind(poem.author_id)
        .bind(&poem.author_name)
        .bind(poem.is_published)
        .bind(poem.statistics.view_count)
        .bind(poem.statistics.like_count)
        .bind(poem.statistics.comment_count)
        .bind(poem.statistics.save_count)
        .bind(poem.created_at)
        .bind(poem.updated_at)
        .execute(self.conn())
        .await?;

        self.write_links(poem, false).await
    }

    /// Update editable fields. Counters are never written here; they only
    /// change through `adjust_poem_statistics`.
    async fn update_poem(&mut self, poem: &Poem) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE poems
            SET title = $2, content = $3, excerpt = $4, is_published = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(poem.id)
        .bind(&poem.title)
        .bind(&poem.content)
        .bind(&poem.excerpt)
        .bind(poem.is_published)
        .bind(poem.updated_at)
        .execute(self.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Poem {} not found", poem.id)));
        }

        self.write_links(poem, true).await
    }

    /// Delete a poem. Links, likes, comments and saved rows go with it via
    /// `ON DELETE CASCADE`.
    async fn delete_poem(&mut self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM poems WHERE id = $1")
            .bind(id)
            .execute(self.conn())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn adjust_poem_statistics(&mut self, id: i64, delta: StatisticsDelta) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE poems
            SET view_count = GREATEST(view_count + $2, 0),
                like_count = GREATEST(like_count + $3, 0),
                comment_count = GREATEST(comment_count + $4, 0),
                save_count = GREATEST(save_count + $5, 0)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta.views)
        .bind(delta.likes)
        .bind(delta.comments)
        .bind(delta.saves)
        .execute(self.conn())
        .await?;

        Ok(())
    }

    async fn rename_poem_author(&mut self, author_id: Uuid, author_name: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE poems SET author_name = $2 WHERE author_id = $1")
            .bind(author_id)
            .bind(author_name)
            .execute(self.conn())
            .await?;

        Ok(result.rows_affected())
    }
}
