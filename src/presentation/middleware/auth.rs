//! Authentication Middleware
//!
//! Validates bearer tokens issued by the identity provider. Requests without
//! an `Authorization` header pass through anonymously; handlers that need a
//! caller ask for [`AuthUser`], which rejects anonymous requests with 401.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::Actor;
use crate::config::JwtSettings;
use crate::domain::MAX_DISPLAY_NAME_LENGTH;
use crate::shared::error::AppError;

/// Name used when the token carries no display name.
const ANONYMOUS_NAME: &str = "Anonymous";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Authenticated user extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub user_name: String,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.user_name.clone())
    }
}

/// Verifies HS256 tokens against the configured secret and issuer.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        }
    }

    /// Decode a token into the caller it identifies.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".into()),
                _ => AppError::Unauthorized("Invalid token".into()),
            }
        })?;

        let claims = token_data.claims;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))?;

        let user_name = claims
            .name
            .or(claims.preferred_username)
            .map(|n| display_name(&n))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

        Ok(AuthUser { user_id, user_name })
    }
}

/// Trim a claimed name and cut it to the stored column width.
fn display_name(raw: &str) -> String {
    let cut: String = raw.trim().chars().take(MAX_DISPLAY_NAME_LENGTH).collect();
    cut.trim_end().to_string()
}

/// Authentication middleware that validates JWT tokens.
///
/// A missing header leaves the request anonymous. A header that is present
/// but malformed, expired or forged is rejected with 401.
pub async fn auth_middleware(
    State(verifier): State<Arc<JwtVerifier>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    if parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized("Invalid authorization header format".into()))?;

        let user = verifier.verify(bearer.token())?;
        parts.extensions.insert(user);
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use pretty_assertions::assert_eq;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn verifier(issuer: Option<&str>) -> JwtVerifier {
        JwtVerifier::new(&JwtSettings {
            secret: SECRET.into(),
            issuer: issuer.map(String::from),
        })
    }

    fn token(sub: &str, name: Option<&str>, exp_offset: i64, iss: Option<&str>) -> String {
        let claims = Claims {
            sub: sub.into(),
            name: name.map(String::from),
            preferred_username: None,
            exp: (Utc::now() + Duration::seconds(exp_offset)).timestamp(),
            iss: iss.map(String::from),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token() {
        let id = Uuid::new_v4();
        let user = verifier(None)
            .verify(&token(&id.to_string(), Some("alice"), 3600, None))
            .unwrap();
        assert_eq!(user, AuthUser { user_id: id, user_name: "alice".into() });
    }

    #[test]
    fn test_missing_name_falls_back() {
        let id = Uuid::new_v4();
        let user = verifier(None)
            .verify(&token(&id.to_string(), None, 3600, None))
            .unwrap();
        assert_eq!(user.user_name, ANONYMOUS_NAME);
    }

    #[test]
    fn test_long_name_cut_to_column_width() {
        let id = Uuid::new_v4();
        let long = format!("  {}", "ä".repeat(150));
        let user = verifier(None)
            .verify(&token(&id.to_string(), Some(&long), 3600, None))
            .unwrap();
        assert_eq!(user.user_name, "ä".repeat(MAX_DISPLAY_NAME_LENGTH));
    }

    #[test]
    fn test_expired_token() {
        let result = verifier(None).verify(&token(&Uuid::new_v4().to_string(), None, -3600, None));
        assert!(matches!(result, Err(AppError::Unauthorized(msg)) if msg == "Token expired"));
    }

    #[test]
    fn test_non_uuid_subject() {
        let result = verifier(None).verify(&token("42", Some("bob"), 3600, None));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_issuer_checked_when_configured() {
        let sub = Uuid::new_v4().to_string();
        let verifier = verifier(Some("https://id.example"));
        assert!(verifier.verify(&token(&sub, None, 3600, Some("https://id.example"))).is_ok());
        assert!(verifier.verify(&token(&sub, None, 3600, Some("https://evil.example"))).is_err());
    }
}
