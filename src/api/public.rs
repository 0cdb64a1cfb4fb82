//! Public page endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::public::{self, RenderModel};
use crate::AppState;

/// GET /api/public/{username} and GET /{username}
pub async fn get_public_page(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<RenderModel> {
    success(public::resolve(&state.repo, &username).await?)
}
