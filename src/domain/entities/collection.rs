//! Collection entity, saved-poem join row and repository trait.
//!
//! Maps to the `collections` and `saved_poems` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A user's named set of saved poems.
///
/// Maps to the `collections` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(100) NOT NULL
/// - description: TEXT NULL
/// - user_id: UUID NOT NULL (owner)
/// - is_public: BOOLEAN NOT NULL
/// - published_poem_count: BIGINT NOT NULL DEFAULT 0
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub is_public: bool,
    /// Number of published poems saved in this collection.
    pub published_poem_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(
        id: i64,
        user_id: Uuid,
        name: String,
        description: Option<String>,
        is_public: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            user_id,
            is_public,
            published_poem_count: 0,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Owners always see their collections; everyone sees public ones.
    pub fn is_viewable_by(&self, user_id: Uuid) -> bool {
        self.is_public || self.is_owned_by(user_id)
    }
}

/// Join row between a collection and a poem.
///
/// Maps to the `saved_poems` table, primary key (collection_id, poem_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPoem {
    pub collection_id: i64,
    pub poem_id: i64,
    pub saved_at: DateTime<Utc>,
}

impl SavedPoem {
    pub fn new(collection_id: i64, poem_id: i64) -> Self {
        Self {
            collection_id,
            poem_id,
            saved_at: Utc::now(),
        }
    }
}

/// Repository trait for Collection data access operations.
#[async_trait]
pub trait CollectionRepository: Send {
    /// Find a live collection.
    async fn find_collection(&mut self, id: i64) -> Result<Option<Collection>, AppError>;

    /// Live collections owned by a user, newest first.
    async fn find_collections_by_user(&mut self, user_id: Uuid) -> Result<Vec<Collection>, AppError>;

    async fn insert_collection(&mut self, collection: &Collection) -> Result<(), AppError>;

    /// Flag a collection as deleted. Returns false if it was already gone.
    async fn soft_delete_collection(&mut self, id: i64) -> Result<bool, AppError>;

    /// Atomically add `delta` to `published_poem_count`, flooring at zero.
    async fn adjust_published_poem_count(&mut self, id: i64, delta: i64) -> Result<(), AppError>;

    /// Saved rows of a collection, most recently saved first.
    async fn find_saved_poems(&mut self, collection_id: i64) -> Result<Vec<SavedPoem>, AppError>;

    async fn saved_poem_exists(&mut self, collection_id: i64, poem_id: i64) -> Result<bool, AppError>;

    async fn insert_saved_poem(&mut self, saved: &SavedPoem) -> Result<(), AppError>;

    /// Remove a saved row. Returns false if it did not exist.
    async fn delete_saved_poem(&mut self, collection_id: i64, poem_id: i64) -> Result<bool, AppError>;

    /// Ids of live collections that hold the poem.
    async fn find_collections_containing_poem(&mut self, poem_id: i64) -> Result<Vec<i64>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let private = Collection::new(1, owner, "Mine".into(), None, false);
        assert!(private.is_viewable_by(owner));
        assert!(!private.is_viewable_by(stranger));

        let public = Collection::new(2, owner, "Ours".into(), None, true);
        assert!(public.is_viewable_by(stranger));
        assert!(!public.is_owned_by(stranger));
        assert_eq!(public.published_poem_count, 0);
    }
}
