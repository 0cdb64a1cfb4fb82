//! Avatar upload endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Extension,
};
use serde::Serialize;

use super::{success, ApiResult};
use crate::draft::{DraftEdit, ProfileField};
use crate::errors::AppError;
use crate::models::Session;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUploaded {
    pub avatar_url: String,
}

/// POST /api/admin/avatar - Store the raw image body. When a draft is open
/// its avatar field is pointed at the new image.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<AvatarUploaded> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("Content-Type header is required".to_string()))?;

    let avatar_url = state
        .avatars
        .put(&session.user_id, content_type, &body)
        .await?;

    if let Some(draft) = state.drafts.get(&session.access_token) {
        draft
            .lock()
            .await
            .apply(DraftEdit::Profile(ProfileField::AvatarUrl(avatar_url.clone())))?;
    }

    success(AvatarUploaded { avatar_url })
}
