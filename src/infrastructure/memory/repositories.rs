//! Repository trait implementations for the in-memory store.
//!
//! Semantics mirror the PostgreSQL queries in
//! `infrastructure::repositories`: same filters, same ordering, same
//! counter floors.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::MemoryTransactionContext;
use crate::domain::{
    names_match, Category, CategoryRepository, Collection, CollectionRepository, Comment,
    CommentRepository, Like, LikeRepository, NotificationRepository, Poem, PoemNotification,
    PoemQuery, PoemRepository, PoemSortField, SavedPoem, StatisticsDelta, Tag, TagRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::PageRequest;

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn compare_poems(a: &Poem, b: &Poem, field: PoemSortField) -> Ordering {
    let primary = match field {
        PoemSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        PoemSortField::Created => a.created_at.cmp(&b.created_at),
        PoemSortField::Likes => a.statistics.like_count.cmp(&b.statistics.like_count),
        PoemSortField::Views => a.statistics.view_count.cmp(&b.statistics.view_count),
        PoemSortField::Comments => a.statistics.comment_count.cmp(&b.statistics.comment_count),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl PoemRepository for MemoryTransactionContext {
    async fn find_poem(&mut self, id: i64) -> Result<Option<Poem>, AppError> {
        Ok(self.working.poems.get(&id).cloned())
    }

    async fn find_poems_by_ids(&mut self, ids: &[i64]) -> Result<Vec<Poem>, AppError> {
        Ok(ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| self.working.poems.get(id).cloned())
            .collect())
    }

    async fn find_poems_by_author(
        &mut self,
        author_id: Uuid,
        include_unpublished: bool,
    ) -> Result<Vec<Poem>, AppError> {
        let mut poems: Vec<Poem> = self
            .working
            .poems
            .values()
            .filter(|p| p.author_id == author_id && (include_unpublished || p.is_published))
            .cloned()
            .collect();
        newest_first(&mut poems, |p| (p.created_at, p.id));
        Ok(poems)
    }

    async fn search_poems(&mut self, query: &PoemQuery) -> Result<(Vec<Poem>, i64), AppError> {
        let term = query
            .search_term
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        let mut matches: Vec<Poem> = self
            .working
            .poems
            .values()
            .filter(|p| query.author_id.map_or(true, |a| p.author_id == a))
            .filter(|p| query.is_published.map_or(true, |flag| p.is_published == flag))
            .filter(|p| {
                term.as_ref().map_or(true, |t| {
                    p.title.to_lowercase().contains(t)
                        || p.content.to_lowercase().contains(t)
                        || p.author_name.to_lowercase().contains(t)
                })
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            let ord = compare_poems(a, b, query.sort_by);
            if query.descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let total = matches.len() as i64;
        Ok((query.page.apply(matches), total))
    }

    async fn insert_poem(&mut self, poem: &Poem) -> Result<(), AppError> {
        if self.working.poems.contains_key(&poem.id) {
            return Err(AppError::Conflict(format!("Poem {} already exists", poem.id)));
        }
        self.working.poems.insert(poem.id, poem.clone());
        Ok(())
    }

    async fn update_poem(&mut self, poem: &Poem) -> Result<(), AppError> {
        let stored = self
            .working
            .poems
            .get_mut(&poem.id)
            .ok_or_else(|| AppError::NotFound(format!("Poem {} not found", poem.id)))?;

        stored.title = poem.title.clone();
        stored.content = poem.content.clone();
        stored.excerpt = poem.excerpt.clone();
        stored.is_published = poem.is_published;
        stored.tags = poem.tags.clone();
        stored.categories = poem.categories.clone();
        stored.updated_at = poem.updated_at;
        Ok(())
    }

    async fn delete_poem(&mut self, id: i64) -> Result<bool, AppError> {
        if self.working.poems.remove(&id).is_none() {
            return Ok(false);
        }
        self.working.comments.retain(|_, c| c.poem_id != id);
        self.working.likes.retain(|_, l| l.poem_id != id);
        self.working.saved_poems.retain(|s| s.poem_id != id);
        Ok(true)
    }

    async fn adjust_poem_statistics(&mut self, id: i64, delta: StatisticsDelta) -> Result<(), AppError> {
        if let Some(poem) = self.working.poems.get_mut(&id) {
            poem.statistics.apply(delta);
        }
        Ok(())
    }

    async fn rename_poem_author(&mut self, author_id: Uuid, author_name: &str) -> Result<u64, AppError> {
        let mut touched = 0;
        for poem in self.working.poems.values_mut().filter(|p| p.author_id == author_id) {
            poem.author_name = author_name.to_string();
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl TagRepository for MemoryTransactionContext {
    async fn get_or_create_tag(&mut self, name: &str, new_id: i64) -> Result<Tag, AppError> {
        if let Some(tag) = self.working.tags.values().find(|t| t.matches(name)) {
            return Ok(tag.clone());
        }
        let tag = Tag { id: new_id, name: name.trim().to_string() };
        self.working.tags.insert(new_id, tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl CategoryRepository for MemoryTransactionContext {
    async fn get_or_create_category(&mut self, name: &str, new_id: i64) -> Result<Category, AppError> {
        if let Some(category) = self.working.categories.values().find(|c| names_match(&c.name, name)) {
            return Ok(category.clone());
        }
        let category = Category { id: new_id, name: name.trim().to_string() };
        self.working.categories.insert(new_id, category.clone());
        Ok(category)
    }
}

#[async_trait]
impl CommentRepository for MemoryTransactionContext {
    async fn find_comment(&mut self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.working.comments.get(&id).cloned())
    }

    async fn find_comments_by_poem(&mut self, poem_id: i64) -> Result<Vec<Comment>, AppError> {
        let mut comments: Vec<Comment> = self
            .working
            .comments
            .values()
            .filter(|c| c.poem_id == poem_id && !c.is_deleted)
            .cloned()
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn find_comments_on_author_poems(
        &mut self,
        author_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Comment>, i64), AppError> {
        let poem_ids: HashSet<i64> = self
            .working
            .poems
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.id)
            .collect();

        let mut comments: Vec<Comment> = self
            .working
            .comments
            .values()
            .filter(|c| !c.is_deleted && poem_ids.contains(&c.poem_id))
            .cloned()
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));

        let total = comments.len() as i64;
        Ok((page.apply(comments), total))
    }

    async fn insert_comment(&mut self, comment: &Comment) -> Result<(), AppError> {
        self.working.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn soft_delete_comment(&mut self, id: i64) -> Result<bool, AppError> {
        match self.working.comments.get_mut(&id) {
            Some(comment) if !comment.is_deleted => {
                comment.is_deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn rename_commenter(&mut self, user_id: Uuid, user_name: &str) -> Result<u64, AppError> {
        let mut touched = 0;
        for comment in self.working.comments.values_mut().filter(|c| c.user_id == user_id) {
            comment.user_name = user_name.to_string();
            touched += 1;
        }
        Ok(touched)
    }
}

#[async_trait]
impl LikeRepository for MemoryTransactionContext {
    async fn like_exists(&mut self, poem_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .working
            .likes
            .values()
            .any(|l| l.poem_id == poem_id && l.user_id == user_id))
    }

    async fn insert_like(&mut self, like: &Like) -> Result<bool, AppError> {
        if self.like_exists(like.poem_id, like.user_id).await? {
            return Ok(false);
        }
        self.working.likes.insert(like.id, like.clone());
        Ok(true)
    }

    async fn delete_like(&mut self, poem_id: i64, user_id: Uuid) -> Result<bool, AppError> {
        let before = self.working.likes.len();
        self.working
            .likes
            .retain(|_, l| !(l.poem_id == poem_id && l.user_id == user_id));
        Ok(self.working.likes.len() < before)
    }
}

#[async_trait]
impl CollectionRepository for MemoryTransactionContext {
    async fn find_collection(&mut self, id: i64) -> Result<Option<Collection>, AppError> {
        Ok(self
            .working
            .collections
            .get(&id)
            .filter(|c| !c.is_deleted)
            .cloned())
    }

    async fn find_collections_by_user(&mut self, user_id: Uuid) -> Result<Vec<Collection>, AppError> {
        let mut collections: Vec<Collection> = self
            .working
            .collections
            .values()
            .filter(|c| c.user_id == user_id && !c.is_deleted)
            .cloned()
            .collect();
        newest_first(&mut collections, |c| (c.created_at, c.id));
        Ok(collections)
    }

    async fn insert_collection(&mut self, collection: &Collection) -> Result<(), AppError> {
        self.working.collections.insert(collection.id, collection.clone());
        Ok(())
    }

    async fn soft_delete_collection(&mut self, id: i64) -> Result<bool, AppError> {
        match self.working.collections.get_mut(&id) {
            Some(collection) if !collection.is_deleted => {
                collection.is_deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn adjust_published_poem_count(&mut self, id: i64, delta: i64) -> Result<(), AppError> {
        if let Some(collection) = self.working.collections.get_mut(&id) {
            collection.published_poem_count = (collection.published_poem_count + delta).max(0);
        }
        Ok(())
    }

    async fn find_saved_poems(&mut self, collection_id: i64) -> Result<Vec<SavedPoem>, AppError> {
        let mut saved: Vec<SavedPoem> = self
            .working
            .saved_poems
            .iter()
            .filter(|s| s.collection_id == collection_id)
            .cloned()
            .collect();
        newest_first(&mut saved, |s| (s.saved_at, s.poem_id));
        Ok(saved)
    }

    async fn saved_poem_exists(&mut self, collection_id: i64, poem_id: i64) -> Result<bool, AppError> {
        Ok(self
            .working
            .saved_poems
            .iter()
            .any(|s| s.collection_id == collection_id && s.poem_id == poem_id))
    }

    async fn insert_saved_poem(&mut self, saved: &SavedPoem) -> Result<(), AppError> {
        if !self.saved_poem_exists(saved.collection_id, saved.poem_id).await? {
            self.working.saved_poems.push(saved.clone());
        }
        Ok(())
    }

    async fn delete_saved_poem(&mut self, collection_id: i64, poem_id: i64) -> Result<bool, AppError> {
        let before = self.working.saved_poems.len();
        self.working
            .saved_poems
            .retain(|s| !(s.collection_id == collection_id && s.poem_id == poem_id));
        Ok(self.working.saved_poems.len() < before)
    }

    async fn find_collections_containing_poem(&mut self, poem_id: i64) -> Result<Vec<i64>, AppError> {
        let collections = &self.working.collections;
        Ok(self
            .working
            .saved_poems
            .iter()
            .filter(|s| s.poem_id == poem_id)
            .filter(|s| collections.get(&s.collection_id).is_some_and(|c| !c.is_deleted))
            .map(|s| s.collection_id)
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for MemoryTransactionContext {
    async fn insert_notification(&mut self, notification: &PoemNotification) -> Result<(), AppError> {
        self.working
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_notifications_by_user(
        &mut self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<PoemNotification>, AppError> {
        let mut notifications: Vec<PoemNotification> = self
            .working
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| (n.created_at, n.id));
        Ok(notifications)
    }

    async fn mark_notification_read(&mut self, id: i64, user_id: Uuid) -> Result<bool, AppError> {
        match self.working.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&mut self, user_id: Uuid) -> Result<u64, AppError> {
        let mut changed = 0;
        for n in self
            .working
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn count_unread_notifications(&mut self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .working
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }
}
