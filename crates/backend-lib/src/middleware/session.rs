// crates/backend-lib/src/middleware/session.rs

//! Session gate for routes that need a signed-in user.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::storage::{Storage, UserRecord};
use crate::AppState;

/// Identity of the caller, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: UserRecord,
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Resolve the caller from the request headers
pub async fn authenticate<S: Storage>(
    state: &AppState<S>,
    headers: &HeaderMap,
) -> AppResult<AuthContext> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Access denied".to_string()))?;
    let claims = state.tokens.verify_access(token)?;

    let user = state
        .storage
        .find_user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(AuthContext { user })
}

/// Reject requests without a valid access token
pub async fn require_session<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate(&state, request.headers()).await?;
    tracing::debug!(user_id = %context.user.id, "session accepted");
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
