//! Telemetry and Observability
//!
//! Structured logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,poetry_server=debug,sqlx=warn,tower_http=debug";

/// Initialize tracing subscriber
///
/// Output is JSON when `LOG_FORMAT=json` or when running in production,
/// human readable otherwise. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_output() {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }

    tracing::info!("Tracing initialized");
}

fn json_output() -> bool {
    let format = std::env::var("LOG_FORMAT").ok();
    let environment = std::env::var("RUN_ENV").ok();
    wants_json(format.as_deref(), environment.as_deref())
}

fn wants_json(format: Option<&str>, environment: Option<&str>) -> bool {
    match format {
        Some(f) => f.eq_ignore_ascii_case("json"),
        None => environment == Some("production"),
    }
}
