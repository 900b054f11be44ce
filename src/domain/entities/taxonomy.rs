//! Tag and Category lookup entities.
//!
//! Both are keyed by name and resolved with get-or-create semantics. Name
//! matching is case-insensitive; the stored spelling is whichever arrived
//! first.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Longest tag or category name (`VARCHAR(50)`).
pub const MAX_NAME_LENGTH: usize = 50;

/// Maps to the `tags` table (unique index on `LOWER(name)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    pub fn matches(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// Maps to the `categories` table (unique index on `LOWER(name)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    pub fn matches(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// Case-insensitive name comparison used for tags and categories.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Trim names, drop blanks and collapse case-insensitive duplicates,
/// keeping the first spelling.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() || out.iter().any(|n| names_match(n, name)) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}

/// First name longer than [`MAX_NAME_LENGTH`] characters, after trimming.
pub fn find_overlong_name<S: AsRef<str>>(names: &[S]) -> Option<&str> {
    names
        .iter()
        .map(|n| n.as_ref().trim())
        .find(|n| n.chars().count() > MAX_NAME_LENGTH)
}

/// Repository trait for tags.
#[async_trait]
pub trait TagRepository: Send {
    /// Return the tag with this name (case-insensitive), creating it with
    /// `new_id` if absent.
    async fn get_or_create_tag(&mut self, name: &str, new_id: i64) -> Result<Tag, AppError>;
}

/// Repository trait for categories.
#[async_trait]
pub trait CategoryRepository: Send {
    /// Return the category with this name (case-insensitive), creating it
    /// with `new_id` if absent.
    async fn get_or_create_category(&mut self, name: &str, new_id: i64) -> Result<Category, AppError>;
}
