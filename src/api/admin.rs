//! Admin editing endpoints.
//!
//! Every route here sits behind `require_session` and works on the draft
//! owned by the caller's access token.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{success, ApiResult};
use crate::draft::{Draft, DraftEdit, EditSession};
use crate::errors::AppError;
use crate::models::{LinkId, Session};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDraftRequest {
    pub entity: String,
    #[serde(default)]
    pub id: Option<LinkId>,
    pub field: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct AddLinkRequest {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveLinkRequest {
    pub index: usize,
}

async fn draft_for(state: &AppState, session: &Session) -> Result<Arc<Mutex<EditSession>>, AppError> {
    state
        .drafts
        .get_or_open(state.repo.clone(), &session.access_token, &session.user_id)
        .await
}

/// POST /api/admin/draft - Start editing from the stored profile.
pub async fn open_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Draft> {
    let draft = state
        .drafts
        .open(state.repo.clone(), &session.access_token, &session.user_id)
        .await?;
    let draft = draft.lock().await;
    success(draft.draft().clone())
}

/// GET /api/admin/draft
pub async fn get_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Draft> {
    let draft = draft_for(&state, &session).await?;
    let draft = draft.lock().await;
    success(draft.draft().clone())
}

/// PATCH /api/admin/draft - Update one profile or link field.
pub async fn edit_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<EditDraftRequest>,
) -> ApiResult<Draft> {
    let edit = DraftEdit::parse(&request.entity, request.id, &request.field, request.value)?;

    let draft = draft_for(&state, &session).await?;
    let mut draft = draft.lock().await;
    draft.apply(edit)?;
    success(draft.draft().clone())
}

/// DELETE /api/admin/draft - Throw away unsaved edits.
pub async fn discard_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<()> {
    state.drafts.discard(&session.access_token);
    success(())
}

/// POST /api/admin/draft/links - Append a link. Blank input leaves the draft
/// unchanged.
pub async fn add_draft_link(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<AddLinkRequest>,
) -> ApiResult<Draft> {
    let draft = draft_for(&state, &session).await?;
    let mut draft = draft.lock().await;
    if draft.add_link(&request.title, &request.url).is_none() {
        tracing::debug!("Ignoring link with blank title or url");
    }
    success(draft.draft().clone())
}

/// DELETE /api/admin/draft/links/{id}
pub async fn remove_draft_link(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> ApiResult<Draft> {
    let draft = draft_for(&state, &session).await?;
    let mut draft = draft.lock().await;
    draft.remove_link(&LinkId::from(id)).await?;
    success(draft.draft().clone())
}

/// PUT /api/admin/draft/links/{id}/position
pub async fn move_draft_link(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(request): Json<MoveLinkRequest>,
) -> ApiResult<Draft> {
    let draft = draft_for(&state, &session).await?;
    let mut draft = draft.lock().await;
    draft.move_link(&LinkId::from(id), request.index)?;
    success(draft.draft().clone())
}

/// POST /api/admin/draft/save - Persist the draft and return the canonical
/// state.
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Draft> {
    let draft = draft_for(&state, &session).await?;
    let mut draft = draft.lock().await;
    let saved = draft.save().await?;
    success(saved.clone())
}
