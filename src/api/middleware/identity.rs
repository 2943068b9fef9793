//! Bearer token identity middleware
//!
//! Rejects the request with 401 unless `Authorization: Bearer <token>` carries
//! a valid token; on success the caller's id is attached to the request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::UserId;
use crate::infrastructure::auth::AuthError;

/// Caller identity resolved from the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub UserId);

/// Validate the bearer token and attach the caller's identity
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let user_id = state
        .token_service
        .validate_token(token)
        .map_err(|e| token_rejection(e, state.expose_token_errors))?;

    request.extensions_mut().insert(Identity(user_id));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("unauthorized"))
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("empty auth header"))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid auth header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("invalid auth header"))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::unauthorized("token is empty"));
    }

    Ok(token)
}

fn token_rejection(err: AuthError, expose: bool) -> ApiError {
    if !err.is_token_error() {
        return err.into();
    }

    debug!(reason = %err, "Rejected bearer token");

    if expose {
        ApiError::unauthorized(err.to_string())
    } else {
        ApiError::unauthorized("unauthorized")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers("Bearer eyJhbGciOiJIUzI1NiJ9.test");
        assert_eq!(
            extract_bearer_token(&headers).unwrap(),
            "eyJhbGciOiJIUzI1NiJ9.test"
        );
    }

    #[test]
    fn test_missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "empty auth header");
    }

    #[test]
    fn test_wrong_scheme() {
        let err = extract_bearer_token(&headers("Basic dXNlcjpwYXNz")).unwrap_err();
        assert_eq!(err.message, "invalid auth header");

        let err = extract_bearer_token(&headers("bearer abc")).unwrap_err();
        assert_eq!(err.message, "invalid auth header");
    }

    #[test]
    fn test_empty_token() {
        let err = extract_bearer_token(&headers("Bearer    ")).unwrap_err();
        assert_eq!(err.message, "token is empty");
    }

    #[test]
    fn test_token_rejection_exposure() {
        assert_eq!(
            token_rejection(AuthError::Expired, true).message,
            "token has expired"
        );
        assert_eq!(
            token_rejection(AuthError::Expired, false).message,
            "unauthorized"
        );
        assert_eq!(
            token_rejection(AuthError::InvalidSignature, false).status,
            StatusCode::UNAUTHORIZED
        );
    }
}
