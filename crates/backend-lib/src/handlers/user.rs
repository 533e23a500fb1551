// ============================
// crates/backend-lib/src/handlers/user.rs
// ============================
//! Profile and link-collection handlers under `/user`.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use linkbranch_common::{
    AddLinkRequest, ImageResponse, OwnProfile, ProfileResponse, ReorderLinksRequest, VisitResponse,
};

use super::{JsonBody, ProfileMultipart};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthContext;
use crate::storage::Storage;
use crate::{links, profile, AppState};

fn profile_response(message: &str, user: OwnProfile) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        message: Some(message.to_string()),
        user,
    })
}

/// `GET /user/me`
#[tracing::instrument(skip_all)]
pub async fn me<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
) -> AppResult<Json<ProfileResponse>> {
    let user = profile::load_own_profile(&state.storage, ctx.user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        message: None,
        user,
    }))
}

/// `PUT /user/user-up`
#[tracing::instrument(skip_all)]
pub async fn update_user<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    ProfileMultipart(form): ProfileMultipart,
) -> AppResult<Json<ProfileResponse>> {
    let user = profile::update_profile(&state.storage, state.blobs.as_ref(), &ctx.user, form)
        .await?;
    Ok(profile_response("User updated successfully", user))
}

/// `POST /user/upload-image`
#[tracing::instrument(skip_all)]
pub async fn upload_image<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    ProfileMultipart(form): ProfileMultipart,
) -> AppResult<Json<ImageResponse>> {
    let upload = form
        .profile_pic
        .ok_or_else(|| AppError::BadRequest("No file found".to_string()))?;
    let image =
        profile::replace_avatar(&state.storage, state.blobs.as_ref(), &ctx.user, upload).await?;

    Ok(Json(ImageResponse {
        success: true,
        message: "Image uploaded successfully".to_string(),
        image,
    }))
}

/// `POST /user/links`
#[tracing::instrument(skip_all)]
pub async fn add_link<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    JsonBody(req): JsonBody<AddLinkRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let user = links::add_link(&state.storage, ctx.user.id, req).await?;
    Ok(profile_response("Link Added", user))
}

/// `PUT /user/links/order`
#[tracing::instrument(skip_all)]
pub async fn reorder_links<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    JsonBody(req): JsonBody<ReorderLinksRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let user = links::reorder_links(&state.storage, ctx.user.id, req).await?;
    Ok(profile_response("Links reordered successfully", user))
}

/// `DELETE /user/{linkId}`
#[tracing::instrument(skip_all)]
pub async fn delete_link<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(ctx): Extension<AuthContext>,
    Path(link_id): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let link_id = links::parse_link_id(&link_id)?;
    let user = links::delete_link(&state.storage, ctx.user.id, link_id).await?;
    Ok(profile_response("Link deleted successfully", user))
}

/// `PATCH /user/{username}/visit`
#[tracing::instrument(skip_all)]
pub async fn record_visit<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
) -> AppResult<Json<VisitResponse>> {
    let visit_count = links::record_visit(&state.storage, &username).await?;
    Ok(Json(VisitResponse {
        success: true,
        message: "Visit recorded".to_string(),
        visit_count,
    }))
}
