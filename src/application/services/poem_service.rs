//! Poem Service
//!
//! Handles poem authoring, publishing, discovery and view counting.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::comment_service::CommentDto;
use super::Actor;
use crate::domain::{
    find_overlong_name, normalize_names, Category, CategoryRepository, CollectionRepository, CommentRepository,
    LikeRepository, Poem, PoemQuery, PoemRepository, PoemSortField, PoemStatistics,
    StatisticsDelta, Tag, TagRepository, TransactionContext, UnitOfWork, MAX_NAME_LENGTH,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::pagination::{PageRequest, PagedResult};
use crate::shared::snowflake::SnowflakeGenerator;

/// Poem service trait
#[async_trait]
pub trait PoemService: Send + Sync {
    /// Get a poem by ID regardless of publish status
    async fn get_by_id(&self, poem_id: i64) -> Result<PoemDto, PoemError>;

    /// Get one of the caller's own poems
    async fn get_own(&self, poem_id: i64, caller: Uuid) -> Result<PoemDto, PoemError>;

    /// Get a poem with like state and live comments
    async fn get_details(&self, poem_id: i64, viewer: Option<Uuid>) -> Result<PoemDetailsDto, PoemError>;

    /// Get an author's poems, newest first
    async fn get_by_author(&self, author_id: Uuid, include_unpublished: bool) -> Result<Vec<PoemDto>, PoemError>;

    /// Filter, sort and paginate poems
    async fn search(&self, filters: PoemSearchDto) -> Result<PagedResult<PoemDto>, PoemError>;

    /// Create a new poem
    async fn create(&self, author: &Actor, request: CreatePoemDto) -> Result<PoemDto, PoemError>;

    /// Replace a poem's editable fields
    async fn update(&self, poem_id: i64, caller: Uuid, update: UpdatePoemDto) -> Result<PoemDto, PoemError>;

    /// Make a poem visible to everyone
    async fn publish(&self, poem_id: i64, caller: Uuid) -> Result<PoemDto, PoemError>;

    /// Hide a poem from everyone but its author
    async fn unpublish(&self, poem_id: i64, caller: Uuid) -> Result<PoemDto, PoemError>;

    /// Delete a poem and everything attached to it
    async fn delete(&self, poem_id: i64, caller: Uuid) -> Result<(), PoemError>;

    /// Count one view of a published poem
    async fn increment_view_count(&self, poem_id: i64) -> Result<(), PoemError>;

    /// Get the title and full text of a poem
    async fn get_content(&self, poem_id: i64, viewer: Option<Uuid>) -> Result<PoemContentDto, PoemError>;
}

/// Create poem request
#[derive(Debug, Clone)]
pub struct CreatePoemDto {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub is_published: bool,
}

/// Update poem request
#[derive(Debug, Clone)]
pub struct UpdatePoemDto {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub is_published: Option<bool>,
}

/// Search filters
#[derive(Debug, Clone, Default)]
pub struct PoemSearchDto {
    pub search_term: Option<String>,
    pub author_id: Option<Uuid>,
    /// Poems having any of these tags (case-insensitive)
    pub tags: Vec<String>,
    /// Poems in any of these categories (case-insensitive)
    pub categories: Vec<String>,
    pub sort_by: PoemSortField,
    pub descending: bool,
    pub published_only: bool,
    pub page: PageRequest,
}

/// Poem data transfer object
#[derive(Debug, Clone)]
pub struct PoemDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub is_published: bool,
    pub statistics: PoemStatistics,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Poem> for PoemDto {
    fn from(poem: Poem) -> Self {
        Self {
            id: poem.id,
            title: poem.title,
            content: poem.content,
            excerpt: poem.excerpt,
            author_id: poem.author_id,
            author_name: poem.author_name,
            is_published: poem.is_published,
            statistics: poem.statistics,
            tags: poem.tags.into_iter().map(|t| t.name).collect(),
            categories: poem.categories.into_iter().map(|c| c.name).collect(),
            created_at: poem.created_at,
            updated_at: poem.updated_at,
        }
    }
}

/// Poem with viewer-specific state and its comments
#[derive(Debug, Clone)]
pub struct PoemDetailsDto {
    pub poem: PoemDto,
    pub is_liked_by_current_user: bool,
    pub comments: Vec<CommentDto>,
}

/// Title and full text of a poem
#[derive(Debug, Clone)]
pub struct PoemContentDto {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// Poem service errors
#[derive(Debug, thiserror::Error)]
pub enum PoemError {
    #[error("Poem not found")]
    NotFound,

    #[error("Only the author can modify this poem")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<PoemError> for AppError {
    fn from(err: PoemError) -> Self {
        match err {
            PoemError::NotFound => AppError::NotFound(err.to_string()),
            PoemError::Forbidden => AppError::Forbidden(err.to_string()),
            PoemError::Validation(msg) => AppError::Validation(msg),
            PoemError::Repository(e) => e,
        }
    }
}

/// PoemService implementation
pub struct PoemServiceImpl<U: UnitOfWork> {
    uow: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U: UnitOfWork> PoemServiceImpl<U> {
    pub fn new(uow: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { uow, id_generator }
    }

    fn validate_text(title: &str, content: &str) -> Result<(), PoemError> {
        if title.trim().is_empty() {
            return Err(PoemError::Validation("Title is required".into()));
        }
        if content.trim().is_empty() {
            return Err(PoemError::Validation("Content is required".into()));
        }
        Ok(())
    }

    fn validate_names(tags: &[String], categories: &[String]) -> Result<(), PoemError> {
        for (kind, names) in [("Tag", tags), ("Category", categories)] {
            if let Some(name) = find_overlong_name(names) {
                return Err(PoemError::Validation(format!(
                    "{kind} '{name}' exceeds {MAX_NAME_LENGTH} characters"
                )));
            }
        }
        Ok(())
    }

    fn excerpt_or_default(excerpt: Option<String>, content: &str) -> String {
        excerpt
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| Poem::excerpt_from(content))
    }

    async fn resolve_tags(&self, tx: &mut U::Context, names: &[String]) -> Result<Vec<Tag>, AppError> {
        let mut tags = Vec::new();
        for name in normalize_names(names) {
            tags.push(tx.get_or_create_tag(&name, self.id_generator.generate()).await?);
        }
        Ok(tags)
    }

    async fn resolve_categories(
        &self,
        tx: &mut U::Context,
        names: &[String],
    ) -> Result<Vec<Category>, AppError> {
        let mut categories = Vec::new();
        for name in normalize_names(names) {
            categories.push(
                tx.get_or_create_category(&name, self.id_generator.generate())
                    .await?,
            );
        }
        Ok(categories)
    }

    /// Load a poem and check that `caller` wrote it.
    async fn find_owned(tx: &mut U::Context, poem_id: i64, caller: Uuid) -> Result<Poem, PoemError> {
        let poem = tx.find_poem(poem_id).await?.ok_or(PoemError::NotFound)?;
        if !poem.is_authored_by(caller) {
            return Err(PoemError::Forbidden);
        }
        Ok(poem)
    }

    /// Apply `delta` to `published_poem_count` of every live collection
    /// holding the poem.
    async fn adjust_containing_collections(
        tx: &mut U::Context,
        poem_id: i64,
        delta: i64,
    ) -> Result<(), AppError> {
        for collection_id in tx.find_collections_containing_poem(poem_id).await? {
            tx.adjust_published_poem_count(collection_id, delta).await?;
        }
        Ok(())
    }

    async fn set_published(&self, poem_id: i64, caller: Uuid, published: bool) -> Result<PoemDto, PoemError> {
        let mut tx = self.uow.begin().await?;
        let mut poem = Self::find_owned(&mut tx, poem_id, caller).await?;

        if poem.is_published != published {
            poem.is_published = published;
            poem.updated_at = Utc::now();
            tx.update_poem(&poem).await?;
            Self::adjust_containing_collections(&mut tx, poem_id, if published { 1 } else { -1 })
                .await?;
        }

        tx.commit().await?;
        info!(poem_id, published, "Poem publish status changed");
        Ok(PoemDto::from(poem))
    }
}

#[async_trait]
impl<U: UnitOfWork> PoemService for PoemServiceImpl<U> {
    async fn get_by_id(&self, poem_id: i64) -> Result<PoemDto, PoemError> {
        let mut tx = self.uow.begin().await?;
        let poem = tx.find_poem(poem_id).await?.ok_or(PoemError::NotFound)?;
        tx.commit().await?;
        Ok(PoemDto::from(poem))
    }

    async fn get_own(&self, poem_id: i64, caller: Uuid) -> Result<PoemDto, PoemError> {
        let poem = self.get_by_id(poem_id).await?;
        if poem.author_id != caller {
            return Err(PoemError::Forbidden);
        }
        Ok(poem)
    }

    async fn get_details(&self, poem_id: i64, viewer: Option<Uuid>) -> Result<PoemDetailsDto, PoemError> {
        let mut tx = self.uow.begin().await?;

        let poem = tx
            .find_poem(poem_id)
            .await?
            .filter(|p| p.is_visible_to(viewer))
            .ok_or(PoemError::NotFound)?;

        let is_liked_by_current_user = match viewer {
            Some(user_id) => tx.like_exists(poem_id, user_id).await?,
            None => false,
        };

        let comments = tx
            .find_comments_by_poem(poem_id)
            .await?
            .into_iter()
            .map(CommentDto::from)
            .collect();

        tx.commit().await?;

        Ok(PoemDetailsDto {
            poem: PoemDto::from(poem),
            is_liked_by_current_user,
            comments,
        })
    }

    async fn get_by_author(&self, author_id: Uuid, include_unpublished: bool) -> Result<Vec<PoemDto>, PoemError> {
        let mut tx = self.uow.begin().await?;
        let poems = tx.find_poems_by_author(author_id, include_unpublished).await?;
        tx.commit().await?;
        Ok(poems.into_iter().map(PoemDto::from).collect())
    }

    async fn search(&self, filters: PoemSearchDto) -> Result<PagedResult<PoemDto>, PoemError> {
        let query = PoemQuery {
            search_term: filters
                .search_term
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            author_id: filters.author_id,
            is_published: filters.published_only.then_some(true),
            sort_by: filters.sort_by,
            descending: filters.descending,
            page: filters.page,
        };

        let mut tx = self.uow.begin().await?;
        let (poems, total) = tx.search_poems(&query).await?;
        tx.commit().await?;

        let tags = normalize_names(&filters.tags);
        let categories = normalize_names(&filters.categories);

        let items: Vec<PoemDto> = poems
            .into_iter()
            .filter(|p| tags.is_empty() || tags.iter().any(|t| p.has_tag(t)))
            .filter(|p| categories.is_empty() || categories.iter().any(|c| p.has_category(c)))
            .map(PoemDto::from)
            .collect();

        debug!(total, returned = items.len(), "Poem search executed");
        Ok(PagedResult::new(items, total, filters.page))
    }

    async fn create(&self, author: &Actor, request: CreatePoemDto) -> Result<PoemDto, PoemError> {
        Self::validate_text(&request.title, &request.content)?;
        Self::validate_names(&request.tags, &request.categories)?;

        let mut tx = self.uow.begin().await?;

        let tags = self.resolve_tags(&mut tx, &request.tags).await?;
        let categories = self.resolve_categories(&mut tx, &request.categories).await?;

        let now = Utc::now();
        let poem = Poem {
            id: self.id_generator.generate(),
            title: request.title.trim().to_string(),
            excerpt: Self::excerpt_or_default(request.excerpt, &request.content),
            content: request.content,
            author_id: author.id,
            author_name: author.name.clone(),
            is_published: request.is_published,
            statistics: PoemStatistics::default(),
            tags,
            categories,
            created_at: now,
            updated_at: now,
        };

        tx.insert_poem(&poem).await?;
        tx.commit().await?;

        info!(poem_id = poem.id, author_id = %author.id, "Poem created");
        Ok(PoemDto::from(poem))
    }

    async fn update(&self, poem_id: i64, caller: Uuid, update: UpdatePoemDto) -> Result<PoemDto, PoemError> {
        Self::validate_text(&update.title, &update.content)?;
        Self::validate_names(&update.tags, &update.categories)?;

        let mut tx = self.uow.begin().await?;
        let mut poem = Self::find_owned(&mut tx, poem_id, caller).await?;

        poem.tags = self.resolve_tags(&mut tx, &update.tags).await?;
        poem.categories = self.resolve_categories(&mut tx, &update.categories).await?;
        poem.title = update.title.trim().to_string();
        poem.excerpt = Self::excerpt_or_default(update.excerpt, &update.content);
        poem.content = update.content;
        poem.updated_at = Utc::now();

        if let Some(published) = update.is_published {
            if published != poem.is_published {
                poem.is_published = published;
                Self::adjust_containing_collections(&mut tx, poem_id, if published { 1 } else { -1 })
                    .await?;
            }
        }

        tx.update_poem(&poem).await?;
        tx.commit().await?;

        info!(poem_id, "Poem updated");
        Ok(PoemDto::from(poem))
    }

    async fn publish(&self, poem_id: i64, caller: Uuid) -> Result<PoemDto, PoemError> {
        self.set_published(poem_id, caller, true).await
    }

    async fn unpublish(&self, poem_id: i64, caller: Uuid) -> Result<PoemDto, PoemError> {
        self.set_published(poem_id, caller, false).await
    }

    async fn delete(&self, poem_id: i64, caller: Uuid) -> Result<(), PoemError> {
        let mut tx = self.uow.begin().await?;
        let poem = Self::find_owned(&mut tx, poem_id, caller).await?;

        if poem.is_published {
            Self::adjust_containing_collections(&mut tx, poem_id, -1).await?;
        }

        if !tx.delete_poem(poem_id).await? {
            return Err(PoemError::NotFound);
        }

        tx.commit().await?;
        info!(poem_id, "Poem deleted");
        Ok(())
    }

    async fn increment_view_count(&self, poem_id: i64) -> Result<(), PoemError> {
        let mut tx = self.uow.begin().await?;
        tx.find_poem(poem_id)
            .await?
            .filter(|p| p.is_visible_to(None))
            .ok_or(PoemError::NotFound)?;
        tx.adjust_poem_statistics(poem_id, StatisticsDelta::views(1)).await?;
        tx.commit().await?;

        metrics::record_engagement("view");
        Ok(())
    }

    async fn get_content(&self, poem_id: i64, viewer: Option<Uuid>) -> Result<PoemContentDto, PoemError> {
        let mut tx = self.uow.begin().await?;
        let poem = tx
            .find_poem(poem_id)
            .await?
            .filter(|p| p.is_visible_to(viewer))
            .ok_or(PoemError::NotFound)?;
        tx.commit().await?;

        Ok(PoemContentDto {
            id: poem.id,
            title: poem.title,
            content: poem.content,
        })
    }
}
