use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims};

/// Secret shared with the identity service, used to verify its access tokens.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Arc<str>,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthConfig::from_ref(state);
        let token = extract_bearer_token(&parts.headers)?;
        let claims = validate_jwt(&token, &auth.jwt_secret)?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "Unauthorized"));
        }

        Ok(AuthUser::from(claims))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::new(ErrorCode::MissingAuthHeader, "Missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid, "Unauthorized"))?;

    // A header without the scheme is passed on as-is and fails verification.
    let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);
    Ok(token.trim().to_string())
}

pub fn validate_jwt(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // Identity-service tokens carry `aud: authenticated`; the signature is what we trust.
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "Unauthorized")
        }
        _ => {
            tracing::debug!(error = %e, "access token rejected");
            AppError::new(ErrorCode::TokenInvalid, "Unauthorized")
        }
    })?;

    Ok(token_data.claims)
}

/// Sign claims with the shared secret. Used by tests and local tooling to mint
/// tokens the extractor accepts.
pub fn sign_jwt(claims: &Claims, jwt_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS256),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}
