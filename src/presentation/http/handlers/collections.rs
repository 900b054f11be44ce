//! Collection Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateCollectionRequest;
use crate::application::dto::response::{CollectionResponse, CollectionWithPoemsResponse};
use crate::application::services::{CollectionService, CollectionServiceImpl};
use crate::domain::UnitOfWork;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::{parse_id, validation_error};
use crate::startup::AppState;

fn collection_service<U: UnitOfWork>(state: &AppState<U>) -> CollectionServiceImpl<U> {
    CollectionServiceImpl::new(state.uow.clone(), state.snowflake.clone())
}

/// The caller's collections
pub async fn list_collections<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
) -> Result<Json<Vec<CollectionResponse>>, AppError> {
    let collections = collection_service(&state)
        .get_user_collections(auth.user_id)
        .await?;

    Ok(Json(
        collections.into_iter().map(CollectionResponse::from).collect(),
    ))
}

/// Create a collection
pub async fn create_collection<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Json(body): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<CollectionResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let collection = collection_service(&state)
        .create(auth.user_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(CollectionResponse::from(collection))))
}

/// A collection with its saved poems
pub async fn get_collection<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(collection_id): Path<String>,
) -> Result<Json<CollectionWithPoemsResponse>, AppError> {
    let collection_id = parse_id(&collection_id, "collection")?;

    let collection = collection_service(&state)
        .get_collection_with_poems(collection_id, auth.user_id)
        .await?;

    Ok(Json(CollectionWithPoemsResponse::from(collection)))
}

/// Delete a collection
pub async fn delete_collection<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(collection_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let collection_id = parse_id(&collection_id, "collection")?;

    collection_service(&state)
        .delete_collection(collection_id, auth.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Save a poem into a collection
pub async fn add_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path((collection_id, poem_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let collection_id = parse_id(&collection_id, "collection")?;
    let poem_id = parse_id(&poem_id, "poem")?;

    let added = collection_service(&state)
        .add_poem_to_collection(collection_id, poem_id, &auth.actor())
        .await?;

    Ok(if added { StatusCode::CREATED } else { StatusCode::OK })
}

/// Remove a saved poem from a collection
pub async fn remove_poem<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path((collection_id, poem_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let collection_id = parse_id(&collection_id, "collection")?;
    let poem_id = parse_id(&poem_id, "poem")?;

    let removed = collection_service(&state)
        .remove_poem_from_collection(collection_id, poem_id, auth.user_id)
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Poem is not in this collection".into()))
    }
}
