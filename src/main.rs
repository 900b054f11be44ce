//! # Poetry Server
//!
//! Backend for a poetry sharing platform.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Storage backend (PostgreSQL or in-memory)
//! - HTTP server

use anyhow::Result;
use tracing::info;

use poetry_server::config::Settings;
use poetry_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    poetry_server::telemetry::init_tracing();

    info!("Starting Poetry Server...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        backend = ?settings.database.backend,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
