//! CORS Middleware Configuration

use std::time::Duration;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Create CORS layer from settings.
///
/// An empty or `*` origin list allows any origin.
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<_> = settings
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| o.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(origins)
            .max_age(Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_for_wildcard_and_explicit_origins() {
        create_cors_layer(&CorsSettings { allowed_origins: vec!["*".into()] });
        create_cors_layer(&CorsSettings {
            allowed_origins: vec!["http://localhost:3000".into(), "not a header\n".into()],
        });
    }
}
