//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;
use crate::domain::UnitOfWork;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router<U: UnitOfWork>(state: AppState<U>) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness::<U>))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API routes
///
/// Bearer tokens are verified for every API request; handlers that need a
/// caller take an `AuthUser`, the rest accept anonymous requests.
fn api_routes<U: UnitOfWork>(state: AppState<U>) -> Router<AppState<U>> {
    Router::new()
        .nest("/poems", poem_routes::<U>())
        .nest("/mypoems", my_poem_routes::<U>())
        .nest("/collections", collection_routes::<U>())
        .nest("/notifications", notification_routes::<U>())
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
}

/// Public poem routes, likes and comments
fn poem_routes<U: UnitOfWork>() -> Router<AppState<U>> {
    Router::new()
        .route("/", get(handlers::poems::search_poems::<U>))
        .route("/author/{author_id}", get(handlers::poems::get_author_poems::<U>))
        .route("/comments/{comment_id}", delete(handlers::comments::delete_comment::<U>))
        .route("/{poem_id}/poemDetailed", get(handlers::poems::get_poem_details::<U>))
        .route("/{poem_id}/content", get(handlers::poems::get_poem_content::<U>))
        .route("/{poem_id}/view", post(handlers::poems::record_view::<U>))
        .route(
            "/{poem_id}/like",
            post(handlers::likes::like_poem::<U>).delete(handlers::likes::unlike_poem::<U>),
        )
        .route("/{poem_id}/liked", get(handlers::likes::like_status::<U>))
        .route(
            "/{poem_id}/comments",
            get(handlers::comments::get_comments::<U>).post(handlers::comments::add_comment::<U>),
        )
}

/// Author routes (protected)
fn my_poem_routes<U: UnitOfWork>() -> Router<AppState<U>> {
    Router::new()
        .route(
            "/",
            get(handlers::my_poems::list_my_poems::<U>).post(handlers::my_poems::create_poem::<U>),
        )
        .route("/comments", get(handlers::my_poems::comments_on_my_poems::<U>))
        .route("/publish/{poem_id}", put(handlers::my_poems::publish_poem::<U>))
        .route("/unpublish/{poem_id}", put(handlers::my_poems::unpublish_poem::<U>))
        .route(
            "/{poem_id}",
            get(handlers::my_poems::get_my_poem::<U>)
                .put(handlers::my_poems::update_poem::<U>)
                .delete(handlers::my_poems::delete_poem::<U>),
        )
}

/// Collection routes (protected)
fn collection_routes<U: UnitOfWork>() -> Router<AppState<U>> {
    Router::new()
        .route(
            "/",
            get(handlers::collections::list_collections::<U>)
                .post(handlers::collections::create_collection::<U>),
        )
        .route(
            "/{collection_id}",
            get(handlers::collections::get_collection::<U>)
                .delete(handlers::collections::delete_collection::<U>),
        )
        .route(
            "/{collection_id}/poems/{poem_id}",
            post(handlers::collections::add_poem::<U>)
                .delete(handlers::collections::remove_poem::<U>),
        )
}

/// Notification routes (protected)
fn notification_routes<U: UnitOfWork>() -> Router<AppState<U>> {
    Router::new()
        .route("/", get(handlers::notifications::list_notifications::<U>))
        .route("/unread-count", get(handlers::notifications::unread_count::<U>))
        .route("/read-all", put(handlers::notifications::mark_all_read::<U>))
        .route("/read/{notification_id}", put(handlers::notifications::mark_read::<U>))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::Settings;
    use crate::infrastructure::memory::InMemoryUnitOfWork;

    fn router() -> Router {
        let settings = Settings::builder("test")
            .and_then(|b| b.set_override("database.backend", "memory"))
            .and_then(|b| b.set_override("jwt.secret", "0123456789abcdef0123456789abcdef"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize::<Settings>())
            .unwrap();
        create_router(AppState::new(InMemoryUnitOfWork::new(), settings))
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_public_routes_allow_anonymous_callers() {
        let request = Request::get("/api/poems").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_caller() {
        let request = Request::get("/api/mypoems").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_bearer_is_rejected() {
        let request = Request::get("/api/poems")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::get("/api/nothing-here").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::NOT_FOUND);
    }
}
