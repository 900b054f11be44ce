//! # Domain Entities
//!
//! Core domain entities of the poetry platform. All entities map directly to
//! their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **Poem**: A poem with denormalized statistics, tags and categories
//! - **Comment**: A soft-deletable comment on a poem
//! - **Like**: One user's like on one poem
//! - **Collection**: A user's set of saved poems (with **SavedPoem** join rows)
//! - **PoemNotification**: A like/comment/save notice for a poem's author
//!
//! ## Lookup Entities
//!
//! - **Tag** / **Category**: Name-keyed, get-or-create
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations. Methods take `&mut self` because implementations run inside a
//! transaction; see [`crate::domain::unit_of_work`].

mod collection;
mod comment;
mod like;
mod notification;
mod poem;
mod taxonomy;

pub use collection::{Collection, CollectionRepository, SavedPoem};
pub use comment::{Comment, CommentRepository};
pub use like::{Like, LikeRepository};
pub use notification::{NotificationRepository, NotificationType, PoemNotification};
pub use poem::{
    Poem, PoemQuery, PoemRepository, PoemSortField, PoemStatistics, StatisticsDelta,
    MAX_DISPLAY_NAME_LENGTH,
};
pub use taxonomy::{
    find_overlong_name, names_match, normalize_names, Category, CategoryRepository, Tag,
    TagRepository, MAX_NAME_LENGTH,
};
