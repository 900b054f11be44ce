//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::config::{Settings, StorageBackend};
use crate::domain::UnitOfWork;
use crate::infrastructure::database::{self, PgUnitOfWork};
use crate::infrastructure::memory::InMemoryUnitOfWork;
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging, JwtVerifier};
use crate::shared::pagination::PageRequest;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
pub struct AppState<U: UnitOfWork> {
    pub uow: Arc<U>,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub jwt: Arc<JwtVerifier>,
    pub settings: Arc<Settings>,
}

impl<U: UnitOfWork> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            uow: self.uow.clone(),
            snowflake: self.snowflake.clone(),
            jwt: self.jwt.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<U: UnitOfWork> AppState<U> {
    pub fn new(uow: U, settings: Settings) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            settings.snowflake.epoch,
        ));
        let jwt = Arc::new(JwtVerifier::new(&settings.jwt));

        Self {
            uow: Arc::new(uow),
            snowflake,
            jwt,
            settings: Arc::new(settings),
        }
    }

    /// Page request clamped to the configured limits
    pub fn page_request(&self, page: Option<u32>, page_size: Option<u32>) -> PageRequest {
        PageRequest::with_limits(
            page,
            page_size,
            self.settings.pagination.default_page_size,
            self.settings.pagination.max_page_size,
        )
    }
}

/// Build the full router with middleware for the given state
pub fn build_router<U: UnitOfWork>(state: AppState<U>) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let router = match settings.database.backend {
            StorageBackend::Postgres => {
                // Create database pool
                let pool = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&pool).await?;
                    tracing::info!("Database migrations applied");
                }

                build_router(AppState::new(PgUnitOfWork::from_pool(pool), settings.clone()))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on shutdown");
                build_router(AppState::new(InMemoryUnitOfWork::new(), settings.clone()))
            }
        };

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
