//! REST API endpoint tests

mod collections_tests;
mod health_tests;
mod notifications_tests;
mod poems_tests;
