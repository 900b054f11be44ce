//! Notification Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::NotificationQuery;
use crate::application::dto::response::{
    MarkAllReadResponse, NotificationResponse, UnreadCountResponse,
};
use crate::application::services::{NotificationService, NotificationServiceImpl};
use crate::domain::UnitOfWork;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

fn notification_service<U: UnitOfWork>(state: &AppState<U>) -> NotificationServiceImpl<U> {
    NotificationServiceImpl::new(state.uow.clone())
}

/// The caller's notifications, newest first
pub async fn list_notifications<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = notification_service(&state)
        .get_user_notifications(auth.user_id, query.unread_only)
        .await?;

    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

pub async fn unread_count<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = notification_service(&state).unread_count(auth.user_id).await?;

    Ok(Json(UnreadCountResponse { count }))
}

/// Mark one notification read
pub async fn mark_read<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let notification_id = parse_id(&notification_id, "notification")?;

    notification_service(&state)
        .mark_as_read(notification_id, auth.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Mark all of the caller's notifications read
pub async fn mark_all_read<U: UnitOfWork>(
    State(state): State<AppState<U>>,
    auth: AuthUser,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    let updated = notification_service(&state)
        .mark_all_as_read(auth.user_id)
        .await?;

    Ok(Json(MarkAllReadResponse { updated }))
}
