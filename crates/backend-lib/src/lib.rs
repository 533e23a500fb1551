// ============================
// linkbranch-backend/src/lib.rs
// ============================
//! Core backend-lib functionality for the `LinkBranch` link-in-bio API.

pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod handlers;
pub mod links;
pub mod middleware;
pub mod profile;
pub mod router;
pub mod storage;
pub mod telemetry;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AccountService, AuthRateLimiter, CookiePolicy, CredentialHasher, TokenService};
use crate::blob::BlobStore;
use crate::config::Settings;
use crate::storage::Storage;

pub use crate::router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Storage backend
    pub storage: S,
    /// Registration and login
    pub accounts: AccountService<S>,
    /// Access and refresh token signing
    pub tokens: Arc<TokenService>,
    /// Session cookie attributes
    pub cookies: CookiePolicy,
    /// Avatar store
    pub blobs: Arc<dyn BlobStore>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl<S: Storage + Clone> AppState<S> {
    /// Create a new application state
    pub fn new(storage: S, blobs: Arc<dyn BlobStore>, settings: Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let tokens = Arc::new(TokenService::new(&settings.auth));
        let hasher = CredentialHasher::new(settings.auth.hash_cost)?;
        let limiter = AuthRateLimiter::new(
            settings.rate_limit.max_attempts,
            Duration::from_secs(settings.rate_limit.lockout_secs),
        );
        let accounts = AccountService::new(storage.clone(), hasher, tokens.clone(), limiter);
        let cookies = CookiePolicy::new(&settings.cookies, &tokens);

        Ok(Self {
            storage,
            accounts,
            tokens,
            cookies,
            blobs,
            settings: Arc::new(settings),
        })
    }
}
