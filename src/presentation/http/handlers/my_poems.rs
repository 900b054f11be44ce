//! Author Poem Handlers
//!
//! Endpoints under `/api/mypoems`, all scoped to the authenticated author.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreatePoemRequest, PageParams, UpdatePoemRequest};
use crate::application::dto::response::{CommentResponse, PoemResponse};
use crate::application::services::{
    CommentService, CommentServiceImpl, PoemService, PoemServiceImpl,
};
use crate::domain::UnitOfWork;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::PagedResult;
use crate::shared::validation::{parse_id, validation_error};
use crate::startup::AppState;

fn poem_service<U: UnitOfWork>(state: &AppState<U>) -> PoemServiceImpl<U> {
    PoemServiceImpl::new(state.uow.clone(), state.snowflake.clone())
}

/// List the caller's poems, drafts included
pub async fn list_my_poems<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
) -> Result<Json<Vec<PoemResponse>>, AppError> {
    let poems = poem_service(&state).get_by_author(auth.user_id, true).await?;

    Ok(Json(poems.into_iter().map(PoemResponse::from).collect()))
}

/// Create a poem
pub async fn create_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Json(body): Json<CreatePoemRequest>,
) -> Result<(StatusCode, Json<PoemResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let poem = poem_service(&state)
        .create(&auth.actor(), body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(PoemResponse::from(poem))))
}

/// Get one of the caller's poems
pub async fn get_my_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<PoemResponse>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    let poem = poem_service(&state).get_own(poem_id, auth.user_id).await?;

    Ok(Json(PoemResponse::from(poem)))
}

/// Replace a poem's editable fields
pub async fn update_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
    Json(body): Json<UpdatePoemRequest>,
) -> Result<Json<PoemResponse>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    if let Some(body_id) = body.id.as_deref() {
        if parse_id(body_id, "poem")? != poem_id {
            return Err(AppError::BadRequest("Poem ID mismatch".into()));
        }
    }

    body.validate().map_err(validation_error)?;

    let poem = poem_service(&state)
        .update(poem_id, auth.user_id, body.into())
        .await?;

    Ok(Json(PoemResponse::from(poem)))
}

/// Delete a poem
pub async fn delete_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    poem_service(&state).delete(poem_id, auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Publish a poem
pub async fn publish_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<PoemResponse>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    let poem = poem_service(&state).publish(poem_id, auth.user_id).await?;

    Ok(Json(PoemResponse::from(poem)))
}

/// Move a poem back to drafts
pub async fn unpublish_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<PoemResponse>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    let poem = poem_service(&state).unpublish(poem_id, auth.user_id).await?;

    Ok(Json(PoemResponse::from(poem)))
}

/// Comments left on the caller's poems
pub async fn comments_on_my_poems<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<PagedResult<CommentResponse>>, AppError> {
    let comment_service = CommentServiceImpl::new(state.uow.clone(), state.snowflake.clone());

    let comments = comment_service
        .get_comments_by_author_poems(auth.user_id, state.page_request(params.page, params.page_size))
        .await?;

    Ok(Json(comments.map(CommentResponse::from)))
}
