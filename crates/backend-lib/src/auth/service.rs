// ============================
// linkbranch-backend/src/auth/service.rs
// ============================
//! Account registration and login.
use std::sync::Arc;

use linkbranch_common::{LoginRequest, RegisterRequest};
use metrics::counter;
use uuid::Uuid;

use super::{AuthRateLimiter, CredentialHasher, TokenService};
use crate::error::{AppError, AppResult};
use crate::storage::{NewUser, Storage, UserInsert, UserRecord};
use crate::telemetry::{LOGIN_FAILED, LOGIN_SUCCEEDED, USER_REGISTERED};
use crate::validation::{validate_login, validate_registration};

const USER_EXISTS: &str = "User already exists";
const INCORRECT_CREDENTIALS: &str = "Incorrect credentials";

/// A freshly created account and its first token pair
#[derive(Debug)]
pub struct Registration {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

/// A successful login
#[derive(Debug)]
pub struct Login {
    pub user_id: Uuid,
    pub access_token: String,
}

/// Registers accounts and checks credentials
#[derive(Clone)]
pub struct AccountService<S> {
    storage: S,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    limiter: AuthRateLimiter,
}

impl<S: Storage> AccountService<S> {
    pub fn new(
        storage: S,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
        limiter: AuthRateLimiter,
    ) -> Self {
        Self {
            storage,
            hasher,
            tokens,
            limiter,
        }
    }

    /// Create an account and issue its first access and refresh tokens
    pub async fn register(&self, req: RegisterRequest) -> AppResult<Registration> {
        validate_registration(&req).map_err(AppError::Validation)?;

        let fullname = req.fullname.trim().to_string();
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_lowercase();

        if self.storage.user_exists(&username, &email).await? {
            return Err(AppError::Conflict(USER_EXISTS.to_string()));
        }

        let password = self.hasher.hash(req.password).await?;
        let user = match self
            .storage
            .create_user(NewUser {
                fullname,
                username,
                email,
                password,
            })
            .await?
        {
            UserInsert::Created(user) => user,
            // Lost a race with a concurrent registration
            UserInsert::Taken => return Err(AppError::Conflict(USER_EXISTS.to_string())),
        };

        let access_token = self.tokens.issue_access_token(user.id, &user.username)?;
        let refresh_token = self.tokens.issue_refresh_token(user.id)?;
        self.storage
            .set_refresh_token(user.id, Some(refresh_token.clone()))
            .await?;

        counter!(USER_REGISTERED).increment(1);
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");

        Ok(Registration {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, req: LoginRequest) -> AppResult<Login> {
        validate_login(&req).map_err(AppError::Validation)?;
        let identity = req.identity.trim();

        if !self.limiter.check_rate_limit(identity) {
            counter!(LOGIN_FAILED).increment(1);
            return Err(AppError::AuthRateLimited);
        }

        let Some(user) = self.storage.find_user_by_identity(identity).await? else {
            self.reject(identity);
            return Err(AppError::Unauthorized(INCORRECT_CREDENTIALS.to_string()));
        };

        if !self.hasher.verify(user.password.clone(), req.password).await? {
            self.reject(identity);
            return Err(AppError::Unauthorized(INCORRECT_CREDENTIALS.to_string()));
        }

        self.limiter.record_success(identity);
        let access_token = self.tokens.issue_access_token(user.id, &user.username)?;

        counter!(LOGIN_SUCCEEDED).increment(1);
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(Login {
            user_id: user.id,
            access_token,
        })
    }

    fn reject(&self, identity: &str) {
        self.limiter.record_failed_attempt(identity);
        counter!(LOGIN_FAILED).increment(1);
        tracing::debug!("login rejected");
    }
}
