//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::services::{CreateCollectionDto, CreatePoemDto, UpdatePoemDto};

/// Create poem request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoemRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,

    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 tags are allowed"))]
    pub tags: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 categories are allowed"))]
    pub categories: Vec<String>,

    #[serde(default)]
    pub is_published: bool,
}

impl From<CreatePoemRequest> for CreatePoemDto {
    fn from(body: CreatePoemRequest) -> Self {
        Self {
            title: body.title,
            content: body.content,
            excerpt: body.excerpt,
            tags: body.tags,
            categories: body.categories,
            is_published: body.is_published,
        }
    }
}

/// Update poem request
///
/// `id`, when present, must match the id in the route.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoemRequest {
    pub id: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,

    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 tags are allowed"))]
    pub tags: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 categories are allowed"))]
    pub categories: Vec<String>,

    pub is_published: Option<bool>,
}

impl From<UpdatePoemRequest> for UpdatePoemDto {
    fn from(body: UpdatePoemRequest) -> Self {
        Self {
            title: body.title,
            content: body.content,
            excerpt: body.excerpt,
            tags: body.tags,
            categories: body.categories,
            is_published: body.is_published,
        }
    }
}

/// Poem search query parameters
///
/// `tags` and `categories` are comma-separated lists.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemSearchParams {
    pub search_term: Option<String>,
    pub author_id: Option<Uuid>,
    pub tags: Option<String>,
    pub categories: Option<String>,
    pub sort_by: Option<String>,
    pub sort_descending: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PoemSearchParams {
    pub fn tag_list(&self) -> Vec<String> {
        split_list(self.tags.as_deref())
    }

    pub fn category_list(&self) -> Vec<String> {
        split_list(self.categories.as_deref())
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Page query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub text: String,
}

/// Create collection request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_public: bool,
}

impl From<CreateCollectionRequest> for CreateCollectionDto {
    fn from(body: CreateCollectionRequest) -> Self {
        Self {
            name: body.name,
            description: body.description,
            is_public: body.is_public,
        }
    }
}

/// Notification list query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}
