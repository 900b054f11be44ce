//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake ids are rendered as
//! strings so JavaScript clients do not lose precision.

use serde::Serialize;

use crate::application::services::{
    CollectionDto, CollectionWithPoemsDto, CommentDto, NotificationDto, PoemContentDto,
    PoemDetailsDto, PoemDto,
};
use crate::domain::PoemStatistics;

/// Poem counters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemStatisticsResponse {
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub save_count: i64,
}

impl From<PoemStatistics> for PoemStatisticsResponse {
    fn from(stats: PoemStatistics) -> Self {
        Self {
            view_count: stats.view_count,
            like_count: stats.like_count,
            comment_count: stats.comment_count,
            save_count: stats.save_count,
        }
    }
}

/// Poem response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author_id: String,
    pub author_name: String,
    pub is_published: bool,
    pub statistics: PoemStatisticsResponse,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PoemDto> for PoemResponse {
    fn from(dto: PoemDto) -> Self {
        Self {
            id: dto.id.to_string(),
            title: dto.title,
            content: dto.content,
            excerpt: dto.excerpt,
            author_id: dto.author_id.to_string(),
            author_name: dto.author_name,
            is_published: dto.is_published,
            statistics: dto.statistics.into(),
            tags: dto.tags,
            categories: dto.categories,
            created_at: dto.created_at.to_rfc3339(),
            updated_at: dto.updated_at.to_rfc3339(),
        }
    }
}

/// Poem with the caller's like state and its comments
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemDetailsResponse {
    #[serde(flatten)]
    pub poem: PoemResponse,
    pub is_liked_by_current_user: bool,
    pub comments: Vec<CommentResponse>,
}

impl From<PoemDetailsDto> for PoemDetailsResponse {
    fn from(dto: PoemDetailsDto) -> Self {
        Self {
            poem: dto.poem.into(),
            is_liked_by_current_user: dto.is_liked_by_current_user,
            comments: dto.comments.into_iter().map(CommentResponse::from).collect(),
        }
    }
}

/// Poem title and text
#[derive(Debug, Serialize)]
pub struct PoemContentResponse {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl From<PoemContentDto> for PoemContentResponse {
    fn from(dto: PoemContentDto) -> Self {
        Self {
            id: dto.id.to_string(),
            title: dto.title,
            content: dto.content,
        }
    }
}

/// Comment response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub poem_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poem_title: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub created_at: String,
}

impl From<CommentDto> for CommentResponse {
    fn from(dto: CommentDto) -> Self {
        Self {
            id: dto.id.to_string(),
            poem_id: dto.poem_id.to_string(),
            poem_title: dto.poem_title,
            user_id: dto.user_id.to_string(),
            user_name: dto.user_name,
            text: dto.text,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Like state of a poem for the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub poem_id: String,
    pub liked: bool,
}

/// Collection response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub is_public: bool,
    pub poem_count: i64,
    pub created_at: String,
}

impl From<CollectionDto> for CollectionResponse {
    fn from(dto: CollectionDto) -> Self {
        Self {
            id: dto.id.to_string(),
            name: dto.name,
            description: dto.description,
            user_id: dto.user_id.to_string(),
            is_public: dto.is_public,
            poem_count: dto.poem_count,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Collection with its poems
#[derive(Debug, Serialize)]
pub struct CollectionWithPoemsResponse {
    #[serde(flatten)]
    pub collection: CollectionResponse,
    pub poems: Vec<PoemResponse>,
}

impl From<CollectionWithPoemsDto> for CollectionWithPoemsResponse {
    fn from(dto: CollectionWithPoemsDto) -> Self {
        Self {
            collection: dto.collection.into(),
            poems: dto.poems.into_iter().map(PoemResponse::from).collect(),
        }
    }
}

/// Notification response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub poem_id: String,
    pub poem_title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<NotificationDto> for NotificationResponse {
    fn from(dto: NotificationDto) -> Self {
        Self {
            id: dto.id.to_string(),
            poem_id: dto.poem_id.to_string(),
            poem_title: dto.poem_title,
            message: dto.message,
            notification_type: dto.notification_type.as_str().to_string(),
            is_read: dto.is_read,
            created_at: dto.created_at.to_rfc3339(),
        }
    }
}

/// Unread notification count
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Result of marking all notifications read
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
