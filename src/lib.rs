//! # Poetry Server Library
//!
//! This crate provides the backend of a poetry sharing platform:
//! - Poems with tags, categories, publishing and search
//! - Comments, likes and personal collections of saved poems
//! - Notifications to authors when readers engage with their poems
//! - PostgreSQL storage, with an in-memory store for tests and local runs
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, in-memory store and metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! poetry_server/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities and unit of work contracts
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ PostgreSQL, in-memory store, metrics
//! +-- presentation/   HTTP routes, handlers and middleware
//! +-- shared/         Common utilities (errors, snowflake IDs, pagination)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
