//! Bearer-token authentication.
//!
//! Protected routes resolve the `Authorization: Bearer <token>` header to a
//! [`Session`] and hand it to handlers through request extensions.

mod gateway;
pub mod mailer;
mod provider;

pub use gateway::SessionGateway;
pub use mailer::LogMailer;
pub use provider::SqliteAuthProvider;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::models::{Session, SessionKind};
use crate::AppState;

/// Extract the bearer token from the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Resolve the bearer token of any live session, recovery included.
pub async fn session_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    state
        .gateway
        .current_session(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session is invalid or has expired".to_string()))
}

/// Middleware for the admin routes: only standard sessions get through.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = match session_from_headers(&state, request.headers()).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    if session.kind != SessionKind::Standard {
        return AppError::Unauthorized("A recovery session can only set a new password".to_string())
            .into_response();
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
