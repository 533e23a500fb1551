// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Registration, login and logout.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use linkbranch_common::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
    RegisteredUser,
};

use super::JsonBody;
use crate::auth::set_cookie_headers;
use crate::error::AppResult;
use crate::storage::Storage;
use crate::AppState;

/// `POST /auth/register`
#[tracing::instrument(skip_all)]
pub async fn register<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let registration = state.accounts.register(req).await?;
    let user = registration.user;

    let cookies = set_cookie_headers([
        state.cookies.access_cookie(registration.access_token),
        state.cookies.refresh_cookie(registration.refresh_token),
    ]);
    let body = RegisterResponse {
        success: true,
        message: "User registered successfully".to_string(),
        data: RegisteredUser {
            user_id: user.id,
            name: user.fullname,
            username: user.username,
            email: user.email,
        },
    };

    Ok((StatusCode::CREATED, cookies, Json(body)))
}

/// `POST /auth/login`
#[tracing::instrument(skip_all)]
pub async fn login<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let login = state.accounts.login(req).await?;

    let cookies = set_cookie_headers([state.cookies.access_cookie(login.access_token.clone())]);
    let body = LoginResponse {
        success: true,
        message: "Access granted".to_string(),
        access_token: login.access_token,
    };

    Ok((cookies, Json(body)))
}

/// `POST /auth/logout`
#[tracing::instrument(skip_all)]
pub async fn logout<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let cookies = set_cookie_headers(state.cookies.removal_cookies());
    let body = MessageResponse {
        success: true,
        message: "User logged out successfully.".to_string(),
    };
    (cookies, Json(body))
}
