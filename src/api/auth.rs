//! Auth API endpoints.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::auth::{bearer_token, session_from_headers};
use crate::models::{PendingConfirmation, Session};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// POST /api/auth/sign-up - Create an account pending email confirmation.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<PendingConfirmation> {
    success(state.gateway.sign_up(&request.email, &request.password).await?)
}

/// POST /api/auth/confirm - Follow the emailed confirmation link.
pub async fn confirm_sign_up(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> ApiResult<Session> {
    success(state.gateway.confirm_sign_up(request.token.trim()).await?)
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Session> {
    success(state.gateway.sign_in(&request.email, &request.password).await?)
}

/// POST /api/auth/sign-out - Revoke the bearer token. Signing out an
/// already dead token succeeds.
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    match session_from_headers(&state, &headers).await {
        Ok(session) => state.gateway.sign_out(&session).await?,
        Err(e) if bearer_token(&headers).is_none() => return Err(e),
        Err(_) => tracing::debug!("Sign-out with a token that is already gone"),
    }
    success(())
}

/// POST /api/auth/reset-password - Always succeeds, whether or not the
/// address is registered.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<()> {
    state.gateway.request_password_reset(&request.email).await;
    success(())
}

/// POST /api/auth/update-password - Set a new password from a recovery
/// session.
pub async fn update_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdatePasswordRequest>,
) -> ApiResult<Session> {
    let Some(token) = bearer_token(&headers) else {
        return Err(crate::errors::AuthError::NoActiveRecoverySession.into());
    };
    let session = state
        .gateway
        .current_session(token)
        .await?
        .ok_or(crate::errors::AuthError::NoActiveRecoverySession)?;

    success(state.gateway.update_password(&session, &request.password).await?)
}

/// GET /api/auth/session - The session behind the bearer token.
pub async fn current_session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Session> {
    success(session_from_headers(&state, &headers).await?)
}
