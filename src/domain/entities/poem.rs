//! Poem entity, its statistics value and repository trait.
//!
//! Maps to the `poems` table plus the `poem_tags` / `poem_categories` link
//! tables in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::taxonomy::{Category, Tag};
use crate::shared::error::AppError;
use crate::shared::pagination::PageRequest;

/// Maximum number of lines copied into a generated excerpt.
const EXCERPT_MAX_LINES: usize = 4;

/// Maximum number of characters in a generated excerpt.
const EXCERPT_MAX_CHARS: usize = 200;

/// Longest display name stored on poems and comments (`VARCHAR(100)`).
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Denormalized counters stored on the poem row.
///
/// Each counter mirrors the number of live child rows of the corresponding
/// kind (likes, live comments, saves in live collections), except
/// `view_count` which counts every view request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemStatistics {
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub save_count: i64,
}

impl PoemStatistics {
    /// Apply a delta, flooring every counter at zero.
    pub fn apply(&mut self, delta: StatisticsDelta) {
        self.view_count = (self.view_count + delta.views).max(0);
        self.like_count = (self.like_count + delta.likes).max(0);
        self.comment_count = (self.comment_count + delta.comments).max(0);
        self.save_count = (self.save_count + delta.saves).max(0);
    }
}

/// A relative change to [`PoemStatistics`], applied atomically by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsDelta {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub saves: i64,
}

impl StatisticsDelta {
    pub fn views(n: i64) -> Self {
        Self { views: n, ..Self::default() }
    }

    pub fn likes(n: i64) -> Self {
        Self { likes: n, ..Self::default() }
    }

    pub fn comments(n: i64) -> Self {
        Self { comments: n, ..Self::default() }
    }

    pub fn saves(n: i64) -> Self {
        Self { saves: n, ..Self::default() }
    }
}

/// Represents a poem.
///
/// Maps to the `poems` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - title: VARCHAR(200) NOT NULL
/// - content: TEXT NOT NULL
/// - excerpt: VARCHAR(500) NOT NULL
/// - author_id: UUID NOT NULL
/// - author_name: VARCHAR(100) NOT NULL (denormalized from the identity provider)
/// - is_published: BOOLEAN NOT NULL
/// - view_count / like_count / comment_count / save_count: BIGINT NOT NULL DEFAULT 0
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub is_published: bool,
    pub statistics: PoemStatistics,
    pub tags: Vec<Tag>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Poem {
    /// Check if the given user wrote this poem.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Whether the given (optional) viewer may see this poem.
    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        self.is_published || viewer.is_some_and(|id| self.is_authored_by(id))
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.matches(name))
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.matches(name))
    }

    /// Build an excerpt from the opening lines of the content.
    pub fn excerpt_from(content: &str) -> String {
        let opening = content
            .lines()
            .map(str::trim_end)
            .skip_while(|line| line.trim().is_empty())
            .take(EXCERPT_MAX_LINES)
            .collect::<Vec<_>>()
            .join("\n");

        if opening.chars().count() <= EXCERPT_MAX_CHARS {
            opening
        } else {
            let mut cut: String = opening.chars().take(EXCERPT_MAX_CHARS).collect();
            cut.push('…');
            cut
        }
    }
}

/// Columns a search can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoemSortField {
    Title,
    #[default]
    Created,
    Likes,
    Views,
    Comments,
}

impl PoemSortField {
    /// Parse a client-supplied sort key; unknown keys fall back to `Created`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "title" => Self::Title,
            "likes" | "likecount" => Self::Likes,
            "views" | "viewcount" => Self::Views,
            "comments" | "commentcount" => Self::Comments,
            _ => Self::Created,
        }
    }

    /// SQL expression used for ordering.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "LOWER(title)",
            Self::Created => "created_at",
            Self::Likes => "like_count",
            Self::Views => "view_count",
            Self::Comments => "comment_count",
        }
    }
}

/// Filters the store evaluates server-side.
///
/// Tag and category facets are deliberately absent; the service applies them
/// to the returned page.
#[derive(Debug, Clone, Default)]
pub struct PoemQuery {
    pub search_term: Option<String>,
    pub author_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub sort_by: PoemSortField,
    pub descending: bool,
    pub page: PageRequest,
}

/// Repository trait for Poem data access operations.
#[async_trait]
pub trait PoemRepository: Send {
    /// Find a poem by its Snowflake ID, with tags and categories loaded.
    async fn find_poem(&mut self, id: i64) -> Result<Option<Poem>, AppError>;

    /// Batch lookup; missing ids are skipped and order is unspecified.
    async fn find_poems_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Poem>, AppError>;

    /// All poems of an author, newest first.
    async fn find_poems_by_author(
        &mut self,
        author_id: Uuid,
        include_unpublished: bool,
    ) -> Result<Vec<Poem>, AppError>;

    /// Filter, sort and paginate. Returns the page and the total match count.
    async fn search_poems(&mut self, query: &PoemQuery) -> Result<(Vec<Poem>, i64), AppError>;

    /// Insert a poem together with its tag and category links.
    async fn insert_poem(&mut self, poem: &Poem) -> Result<(), AppError>;

    /// Persist editable fields and replace tag/category links.
    async fn update_poem(&mut self, poem: &Poem) -> Result<(), AppError>;

    /// Hard delete a poem and every row that references it, except notifications.
    async fn delete_poem(&mut self, id: i64) -> Result<bool, AppError>;

    /// Atomically add `delta` to the poem's counters, flooring at zero.
    async fn adjust_poem_statistics(&mut self, id: i64, delta: StatisticsDelta) -> Result<(), AppError>;

    /// Rewrite the denormalized author name on all of an author's poems.
    async fn rename_poem_author(&mut self, author_id: Uuid, author_name: &str) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statistics_floor_at_zero() {
        let mut stats = PoemStatistics { like_count: 1, ..Default::default() };
        stats.apply(StatisticsDelta::likes(-1));
        stats.apply(StatisticsDelta::likes(-1));
        stats.apply(StatisticsDelta::comments(-3));
        assert_eq!(stats, PoemStatistics::default());
    }

    #[test]
    fn test_excerpt_takes_opening_lines() {
        let content = "\n\nline one\nline two\nline three\nline four\nline five";
        assert_eq!(
            Poem::excerpt_from(content),
            "line one\nline two\nline three\nline four"
        );
    }

    #[test]
    fn test_excerpt_truncates_long_lines() {
        let content = "a".repeat(500);
        let excerpt = Poem::excerpt_from(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 1);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(PoemSortField::parse("Title"), PoemSortField::Title);
        assert_eq!(PoemSortField::parse("likeCount"), PoemSortField::Likes);
        assert_eq!(PoemSortField::parse("nonsense"), PoemSortField::Created);
        assert_eq!(PoemSortField::Views.column(), "view_count");
    }
}
