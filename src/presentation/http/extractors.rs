//! Custom Extractors
//!
//! Axum extractors for the caller identity placed in request extensions by
//! [`auth_middleware`](crate::presentation::middleware::auth_middleware).

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))
    }
}

/// The caller, if the request carried a valid token.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
