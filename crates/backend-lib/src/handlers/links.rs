// ============================
// crates/backend-lib/src/handlers/links.rs
// ============================
//! Link listing and editing handlers under `/links`.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use linkbranch_common::{LinkResponse, UpdateLinkRequest, UserLinks, UserLinksResponse};

use super::JsonBody;
use crate::error::AppResult;
use crate::middleware::AuthContext;
use crate::storage::Storage;
use crate::{links, profile, AppState};

fn listing(data: UserLinks) -> Json<UserLinksResponse> {
    Json(UserLinksResponse {
        success: true,
        message: "Links fetched successfully".to_string(),
        data,
    })
}

/// `GET /links`
#[tracing::instrument(skip_all)]
pub async fn own_links<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<UserLinksResponse>> {
    let data = profile::load_user_links(&state.storage, ctx.user.id).await?;
    Ok(listing(data))
}

/// `GET /links/{username}`
#[tracing::instrument(skip_all)]
pub async fn public_links<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
) -> AppResult<Json<UserLinksResponse>> {
    let data = profile::load_public_links(&state.storage, &username).await?;
    Ok(listing(data))
}

/// `PUT /links/{linkId}`
#[tracing::instrument(skip_all)]
pub async fn update_link<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    Path(link_id): Path<String>,
    JsonBody(req): JsonBody<UpdateLinkRequest>,
) -> AppResult<Json<LinkResponse>> {
    let link_id = links::parse_link_id(&link_id)?;
    let data = links::update_link(&state.storage, ctx.user.id, link_id, req).await?;
    Ok(Json(LinkResponse {
        success: true,
        message: "Link updated successfully".to_string(),
        data,
    }))
}
