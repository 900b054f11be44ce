//! Collection Service
//!
//! Handles user collections of saved poems. Saving a poem bumps its
//! `save_count`; a collection's `published_poem_count` tracks how many of
//! its poems are published.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::poem_service::PoemDto;
use super::Actor;
use crate::domain::{
    Collection, CollectionRepository, NotificationRepository, NotificationType,
    PoemNotification, PoemRepository, SavedPoem, StatisticsDelta, TransactionContext,
    UnitOfWork,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Collection service trait
#[async_trait]
pub trait CollectionService: Send + Sync {
    /// Create a new collection
    async fn create(&self, owner: Uuid, request: CreateCollectionDto) -> Result<CollectionDto, CollectionError>;

    /// Live collections owned by a user
    async fn get_user_collections(&self, user_id: Uuid) -> Result<Vec<CollectionDto>, CollectionError>;

    /// A collection with its poems, most recently saved first
    async fn get_collection_with_poems(
        &self,
        collection_id: i64,
        caller: Uuid,
    ) -> Result<CollectionWithPoemsDto, CollectionError>;

    /// Save a poem. Returns false if it was already in the collection.
    async fn add_poem_to_collection(
        &self,
        collection_id: i64,
        poem_id: i64,
        actor: &Actor,
    ) -> Result<bool, CollectionError>;

    /// Remove a saved poem. Returns false if it was not in the collection.
    async fn remove_poem_from_collection(
        &self,
        collection_id: i64,
        poem_id: i64,
        caller: Uuid,
    ) -> Result<bool, CollectionError>;

    /// Soft delete a collection
    async fn delete_collection(&self, collection_id: i64, caller: Uuid) -> Result<(), CollectionError>;
}

/// Create collection request
#[derive(Debug, Clone)]
pub struct CreateCollectionDto {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

/// Collection data transfer object
#[derive(Debug, Clone)]
pub struct CollectionDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub is_public: bool,
    /// Number of published poems in the collection
    pub poem_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Collection> for CollectionDto {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            description: collection.description,
            user_id: collection.user_id,
            is_public: collection.is_public,
            poem_count: collection.published_poem_count,
            created_at: collection.created_at,
        }
    }
}

/// A collection together with its poems
#[derive(Debug, Clone)]
pub struct CollectionWithPoemsDto {
    pub collection: CollectionDto,
    pub poems: Vec<PoemDto>,
}

/// Collection service errors
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Collection not found")]
    NotFound,

    #[error("Poem not found")]
    PoemNotFound,

    #[error("You do not have access to this collection")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<CollectionError> for AppError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::NotFound | CollectionError::PoemNotFound => {
                AppError::NotFound(err.to_string())
            }
            CollectionError::Forbidden => AppError::Forbidden(err.to_string()),
            CollectionError::Validation(msg) => AppError::Validation(msg),
            CollectionError::Repository(e) => e,
        }
    }
}

/// CollectionService implementation
pub struct CollectionServiceImpl<U: UnitOfWork> {
    uow: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U: UnitOfWork> CollectionServiceImpl<U> {
    pub fn new(uow: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { uow, id_generator }
    }

    /// Load a live collection and check that `caller` owns it.
    async fn find_owned(
        tx: &mut U::Context,
        collection_id: i64,
        caller: Uuid,
    ) -> Result<Collection, CollectionError> {
        let collection = tx
            .find_collection(collection_id)
            .await?
            .ok_or(CollectionError::NotFound)?;
        if !collection.is_owned_by(caller) {
            return Err(CollectionError::Forbidden);
        }
        Ok(collection)
    }
}

#[async_trait]
impl<U: UnitOfWork> CollectionService for CollectionServiceImpl<U> {
    async fn create(&self, owner: Uuid, request: CreateCollectionDto) -> Result<CollectionDto, CollectionError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CollectionError::Validation("Collection name is required".into()));
        }

        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let collection = Collection::new(
            self.id_generator.generate(),
            owner,
            name.to_string(),
            description,
            request.is_public,
        );

        let mut tx = self.uow.begin().await?;
        tx.insert_collection(&collection).await?;
        tx.commit().await?;

        info!(collection_id = collection.id, user_id = %owner, "Collection created");
        Ok(CollectionDto::from(collection))
    }

    async fn get_user_collections(&self, user_id: Uuid) -> Result<Vec<CollectionDto>, CollectionError> {
        let mut tx = self.uow.begin().await?;
        let collections = tx.find_collections_by_user(user_id).await?;
        tx.commit().await?;
        Ok(collections.into_iter().map(CollectionDto::from).collect())
    }

    async fn get_collection_with_poems(
        &self,
        collection_id: i64,
        caller: Uuid,
    ) -> Result<CollectionWithPoemsDto, CollectionError> {
        let mut tx = self.uow.begin().await?;

        let collection = tx
            .find_collection(collection_id)
            .await?
            .ok_or(CollectionError::NotFound)?;
        if !collection.is_viewable_by(caller) {
            return Err(CollectionError::Forbidden);
        }

        let saved = tx.find_saved_poems(collection_id).await?;
        let poem_ids: Vec<i64> = saved.iter().map(|s| s.poem_id).collect();
        let mut poems: HashMap<i64, _> = tx
            .find_poems_by_ids(&poem_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        tx.commit().await?;

        // Keep the saved_at order of the join rows
        let poems = saved
            .iter()
            .filter_map(|s| poems.remove(&s.poem_id))
            .filter(|p| p.is_visible_to(Some(caller)))
            .map(PoemDto::from)
            .collect();

        Ok(CollectionWithPoemsDto {
            collection: CollectionDto::from(collection),
            poems,
        })
    }

    async fn add_poem_to_collection(
        &self,
        collection_id: i64,
        poem_id: i64,
        actor: &Actor,
    ) -> Result<bool, CollectionError> {
        let mut tx = self.uow.begin().await?;

        Self::find_owned(&mut tx, collection_id, actor.id).await?;
        let poem = tx
            .find_poem(poem_id)
            .await?
            .filter(|p| p.is_visible_to(Some(actor.id)))
            .ok_or(CollectionError::PoemNotFound)?;

        if tx.saved_poem_exists(collection_id, poem_id).await? {
            debug!(collection_id, poem_id, "Poem already saved");
            return Ok(false);
        }

        tx.insert_saved_poem(&SavedPoem::new(collection_id, poem_id)).await?;
        tx.adjust_poem_statistics(poem_id, StatisticsDelta::saves(1)).await?;
        if poem.is_published {
            tx.adjust_published_poem_count(collection_id, 1).await?;
        }

        let notify = poem.author_id != actor.id;
        if notify {
            let kind = NotificationType::PoemSaved;
            let notification = PoemNotification::new(
                self.id_generator.generate(),
                poem.author_id,
                poem_id,
                kind,
                kind.message(&actor.name, &poem.title),
            );
            tx.insert_notification(&notification).await?;
        }

        tx.commit().await?;

        metrics::record_engagement("save");
        if notify {
            metrics::record_notification(NotificationType::PoemSaved.as_str());
        }
        info!(collection_id, poem_id, "Poem saved to collection");

        Ok(true)
    }

    async fn remove_poem_from_collection(
        &self,
        collection_id: i64,
        poem_id: i64,
        caller: Uuid,
    ) -> Result<bool, CollectionError> {
        let mut tx = self.uow.begin().await?;

        Self::find_owned(&mut tx, collection_id, caller).await?;

        if !tx.delete_saved_poem(collection_id, poem_id).await? {
            return Ok(false);
        }

        tx.adjust_poem_statistics(poem_id, StatisticsDelta::saves(-1)).await?;
        if tx.find_poem(poem_id).await?.is_some_and(|p| p.is_published) {
            tx.adjust_published_poem_count(collection_id, -1).await?;
        }

        tx.commit().await?;
        info!(collection_id, poem_id, "Poem removed from collection");
        Ok(true)
    }

    async fn delete_collection(&self, collection_id: i64, caller: Uuid) -> Result<(), CollectionError> {
        let mut tx = self.uow.begin().await?;

        Self::find_owned(&mut tx, collection_id, caller).await?;

        for saved in tx.find_saved_poems(collection_id).await? {
            tx.adjust_poem_statistics(saved.poem_id, StatisticsDelta::saves(-1))
                .await?;
        }
        tx.soft_delete_collection(collection_id).await?;

        tx.commit().await?;
        info!(collection_id, "Collection deleted");
        Ok(())
    }
}
