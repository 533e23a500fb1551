//! Shared helpers for router-level tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use linkbranch_backend::{
    blob::LocalBlobStore, config::Settings, create_router, storage::FlatFileStorage, AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PREFIX: &str = "/api/v1";

pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cookies: Vec<String>,
    pub body: Value,
}

pub fn test_settings(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.storage.path = dir.path().to_path_buf();
    settings.auth.access_token_secret = "test-access-secret".to_string();
    settings.auth.refresh_token_secret = "test-refresh-secret".to_string();
    settings.auth.hash_cost = 4;
    settings.server.api_prefix = PREFIX.to_string();
    settings
}

pub fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(&dir);
    let storage = FlatFileStorage::new(&settings.storage.path).unwrap();
    let blobs = Arc::new(
        LocalBlobStore::new(settings.uploads_dir(), &settings.uploads.public_base_url).unwrap(),
    );
    let state = Arc::new(AppState::new(storage, blobs, settings).unwrap());
    TestApp {
        router: create_router(state),
        dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{PREFIX}{path}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            cookies,
            body,
        }
    }

    pub async fn register(&self, username: &str, email: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "fullname": "Test User",
                "username": username,
                "email": email,
                "password": "secret-pass",
            })),
        )
        .await
    }

    pub async fn login(&self, identity: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identity": identity, "password": password })),
        )
        .await
    }

    /// Register a user and return an access token for them
    pub async fn signed_in(&self, username: &str) -> String {
        let registered = self
            .register(username, &format!("{username}@example.com"))
            .await;
        assert_eq!(registered.status, StatusCode::CREATED);
        let login = self.login(username, "secret-pass").await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn add_link(&self, token: &str, platform: &str, url: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/user/links",
            Some(token),
            Some(json!({ "platform": platform, "url": url })),
        )
        .await
    }
}
