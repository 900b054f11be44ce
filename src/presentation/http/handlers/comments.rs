//! Comment Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateCommentRequest;
use crate::application::dto::response::CommentResponse;
use crate::application::services::{CommentService, CommentServiceImpl};
use crate::domain::UnitOfWork;
use crate::presentation::http::extractors::MaybeAuthUser;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::{parse_id, validation_error};
use crate::startup::AppState;

fn comment_service<U: UnitOfWork>(state: &AppState<U>) -> CommentServiceImpl<U> {
    CommentServiceImpl::new(state.uow.clone(), state.snowflake.clone())
}

/// Live comments on a poem, newest first
pub async fn get_comments<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    viewer: MaybeAuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    let comments = comment_service(&state)
        .get_comments(poem_id, viewer.user_id())
        .await?;

    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// Comment on a poem
pub async fn add_comment<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;
    body.validate().map_err(validation_error)?;

    let comment = comment_service(&state)
        .add_comment(poem_id, &auth.actor(), body.text)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Delete a comment
pub async fn delete_comment<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let comment_id = parse_id(&comment_id, "comment")?;

    comment_service(&state)
        .delete_comment(comment_id, auth.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
