//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod health;
pub mod poems;
pub mod my_poems;
pub mod likes;
pub mod comments;
pub mod collections;
pub mod notifications;
