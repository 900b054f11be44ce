//! Like Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::response::LikeStatusResponse;
use crate::application::services::{LikeService, LikeServiceImpl};
use crate::domain::UnitOfWork;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn like_service<U: UnitOfWork>(state: &AppState<U>) -> LikeServiceImpl<U> {
    LikeServiceImpl::new(state.uow.clone(), state.snowflake.clone())
}

/// Like a poem. Liking twice is not an error.
pub async fn like_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<LikeStatusResponse>, AppError> {
    let id = parse_id(&poem_id, "poem")?;

    like_service(&state).like(id, &auth.actor()).await?;

    Ok(Json(LikeStatusResponse { poem_id: id.to_string(), liked: true }))
}

/// Remove a like
pub async fn unlike_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    if like_service(&state).unlike(poem_id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Like not found".into()))
    }
}

/// Whether the caller likes a poem
pub async fn like_status<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<LikeStatusResponse>, AppError> {
    let id = parse_id(&poem_id, "poem")?;

    let liked = like_service(&state).is_liked_by_user(id, auth.user_id).await?;

    Ok(Json(LikeStatusResponse { poem_id: id.to_string(), liked }))
}
