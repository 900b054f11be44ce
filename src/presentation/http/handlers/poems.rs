//! Public Poem Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::PoemSearchParams;
use crate::application::dto::response::{
    PoemContentResponse, PoemDetailsResponse, PoemResponse,
};
use crate::application::services::{PoemSearchDto, PoemService, PoemServiceImpl};
use crate::domain::{PoemSortField, UnitOfWork};
use crate::presentation::http::extractors::MaybeAuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::PagedResult;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn poem_service<U: UnitOfWork>(state: &AppState<U>) -> PoemServiceImpl<U> {
    PoemServiceImpl::new(state.uow.clone(), state.snowflake.clone())
}

/// Search published poems
pub async fn search_poems<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    Query(params): Query<PoemSearchParams>,
) -> Result<Json<PagedResult<PoemResponse>>, AppError> {
    let filters = PoemSearchDto {
        search_term: params.search_term.clone(),
        author_id: params.author_id,
        tags: params.tag_list(),
        categories: params.category_list(),
        sort_by: params
            .sort_by
            .as_deref()
            .map(PoemSortField::parse)
            .unwrap_or_default(),
        descending: params.sort_descending.unwrap_or(true),
        published_only: true,
        page: state.page_request(params.page, params.page_size),
    };

    let result = poem_service(&state).search(filters).await?;

    Ok(Json(result.map(PoemResponse::from)))
}

/// Get a poem with its comments and the caller's like state
pub async fn get_poem_details<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    viewer: MaybeAuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<PoemDetailsResponse>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    let details = poem_service(&state)
        .get_details(poem_id, viewer.user_id())
        .await?;

    Ok(Json(PoemDetailsResponse::from(details)))
}

/// Get the title and text of a poem
pub async fn get_poem_content<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    viewer: MaybeAuthUser,
    Path(poem_id): Path<String>,
) -> Result<Json<PoemContentResponse>, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    let content = poem_service(&state)
        .get_content(poem_id, viewer.user_id())
        .await?;

    Ok(Json(PoemContentResponse::from(content)))
}

/// Get an author's published poems
pub async fn get_author_poems<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    Path(author_id): Path<String>,
) -> Result<Json<Vec<PoemResponse>>, AppError> {
    let author_id = Uuid::parse_str(&author_id)
        .map_err(|_| AppError::BadRequest("Invalid author ID".into()))?;

    let poems = poem_service(&state).get_by_author(author_id, false).await?;

    Ok(Json(poems.into_iter().map(PoemResponse::from).collect()))
}

/// Count a view
pub async fn record_view<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    Path(poem_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let poem_id = parse_id(&poem_id, "poem")?;

    poem_service(&state).increment_view_count(poem_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
