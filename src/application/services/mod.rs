//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **PoemService**: Poem CRUD, publishing, search and view counting
//! - **CommentService**: Comments and their author notifications
//! - **LikeService**: Idempotent likes
//! - **CollectionService**: Collections of saved poems
//! - **NotificationService**: Reading and acknowledging notifications
//! - **UserProfileService**: Propagating display-name changes
//!
//! Every service method runs in one unit of work and commits once.

pub mod collection_service;
pub mod comment_service;
pub mod like_service;
pub mod notification_service;
pub mod poem_service;
pub mod user_profile_service;

use uuid::Uuid;

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    /// Display name, copied onto comments and into notification messages.
    pub name: String,
}

impl Actor {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

// Re-export poem service types
pub use poem_service::{
    CreatePoemDto, PoemContentDto, PoemDetailsDto, PoemDto, PoemError, PoemSearchDto,
    PoemService, PoemServiceImpl, UpdatePoemDto,
};

// Re-export comment service types
pub use comment_service::{CommentDto, CommentError, CommentService, CommentServiceImpl};

// Re-export like service types
pub use like_service::{LikeError, LikeService, LikeServiceImpl};

// Re-export collection service types
pub use collection_service::{
    CollectionDto, CollectionError, CollectionService, CollectionServiceImpl,
    CollectionWithPoemsDto, CreateCollectionDto,
};

// Re-export notification service types
pub use notification_service::{
    NotificationDto, NotificationError, NotificationService, NotificationServiceImpl,
};

// Re-export user profile service types
pub use user_profile_service::{UserProfileError, UserProfileService, UserProfileServiceImpl};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::poem_service::{CreatePoemDto, PoemService, PoemServiceImpl};
    use super::Actor;
    use crate::domain::{Poem, PoemNotification, PoemRepository, NotificationRepository, UnitOfWork, TransactionContext};
    use crate::infrastructure::memory::InMemoryUnitOfWork;
    use crate::shared::snowflake::SnowflakeGenerator;

    pub fn store() -> (Arc<InMemoryUnitOfWork>, Arc<SnowflakeGenerator>) {
        (Arc::new(InMemoryUnitOfWork::new()), Arc::new(SnowflakeGenerator::default()))
    }

    pub fn actor(name: &str) -> Actor {
        Actor::new(Uuid::new_v4(), name)
    }

    pub fn poem_request(title: &str, published: bool) -> CreatePoemDto {
        CreatePoemDto {
            title: title.to_string(),
            content: format!("{title}\nsecond line"),
            excerpt: None,
            tags: vec![],
            categories: vec![],
            is_published: published,
        }
    }

    /// Create a poem through the service and return its id.
    pub async fn seed_poem(
        uow: &Arc<InMemoryUnitOfWork>,
        ids: &Arc<SnowflakeGenerator>,
        author: &Actor,
        title: &str,
        published: bool,
    ) -> i64 {
        PoemServiceImpl::new(uow.clone(), ids.clone())
            .create(author, poem_request(title, published))
            .await
            .unwrap()
            .id
    }

    pub async fn load_poem(uow: &InMemoryUnitOfWork, id: i64) -> Option<Poem> {
        let mut tx = uow.begin().await.unwrap();
        let poem = tx.find_poem(id).await.unwrap();
        tx.rollback().await.unwrap();
        poem
    }

    pub async fn notifications_of(uow: &InMemoryUnitOfWork, user: Uuid) -> Vec<PoemNotification> {
        let mut tx = uow.begin().await.unwrap();
        let found = tx.find_notifications_by_user(user, false).await.unwrap();
        tx.rollback().await.unwrap();
        found
    }
}
