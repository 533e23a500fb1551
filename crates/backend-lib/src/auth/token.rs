// ============================
// linkbranch-backend/src/auth/token.rs
// ============================
//! Signed access and refresh tokens.
//!
//! Both token kinds are HS256 JWTs signed with distinct secrets. Access tokens
//! carry `{userId, username}` and live for an hour by default; refresh tokens
//! carry `{userId}` and live for five days. Verification failures are all
//! reported as [`TokenError::Invalid`] so callers cannot tell an expired token
//! from a forged one.
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthSettings;

/// Claims of a short-lived access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

/// Claims of a long-lived refresh token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: Uuid,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and verifies access and refresh tokens
pub struct TokenService {
    access: Keys,
    refresh: Keys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            access: Keys::from_secret(&settings.access_token_secret),
            refresh: Keys::from_secret(&settings.refresh_token_secret),
            access_ttl: Duration::from_secs(settings.access_token_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.refresh_token_ttl_secs),
            validation: Validation::default(),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token binding the user id and username
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let (iat, exp) = validity_window(self.access_ttl);
        let claims = AccessClaims {
            user_id,
            username: username.to_string(),
            iat,
            exp,
        };
        encode(&Header::default(), &claims, &self.access.encoding)
    }

    /// Sign a refresh token; the caller persists it on the user record
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let (iat, exp) = validity_window(self.refresh_ttl);
        let claims = RefreshClaims { user_id, iat, exp };
        encode(&Header::default(), &claims, &self.refresh.encoding)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify(token, &self.access.decoding, "access")
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.verify(token, &self.refresh.decoding, "refresh")
    }

    fn verify<C: DeserializeOwned>(
        &self,
        token: &str,
        key: &DecodingKey,
        kind: &'static str,
    ) -> Result<C, TokenError> {
        decode::<C>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind, error = %e, "token rejected");
                TokenError::Invalid
            })
    }
}

fn validity_window(ttl: Duration) -> (u64, u64) {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    (now, now + ttl.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            access_token_secret: "access-secret".to_string(),
            refresh_token_secret: "refresh-secret".to_string(),
            ..AuthSettings::default()
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let tokens = TokenService::new(&settings());
        let user_id = Uuid::new_v4();

        let token = tokens.issue_access_token(user_id, "ada").unwrap();
        let claims = tokens.verify_access(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_token_uses_its_own_secret() {
        let tokens = TokenService::new(&settings());
        let user_id = Uuid::new_v4();

        let refresh = tokens.issue_refresh_token(user_id).unwrap();
        assert_eq!(tokens.verify_refresh(&refresh).unwrap().user_id, user_id);
        assert_eq!(tokens.verify_access(&refresh), Err(TokenError::Invalid));

        let access = tokens.issue_access_token(user_id, "ada").unwrap();
        assert_eq!(tokens.verify_refresh(&access), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_and_malformed_tokens_are_invalid() {
        let tokens = TokenService::new(&settings());
        let token = tokens.issue_access_token(Uuid::new_v4(), "ada").unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert_eq!(tokens.verify_access(&tampered), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_access(""), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_access("not.a.jwt"), Err(TokenError::Invalid));

        let other = TokenService::new(&AuthSettings {
            access_token_secret: "someone-else".to_string(),
            ..settings()
        });
        assert_eq!(other.verify_access(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let settings = settings();
        let tokens = TokenService::new(&settings);
        let past = u64::try_from(Utc::now().timestamp()).unwrap() - 3 * 60 * 60;
        let claims = AccessClaims {
            user_id: Uuid::new_v4(),
            username: "ada".to_string(),
            iat: past - 3600,
            exp: past,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(settings.access_token_secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(tokens.verify_access(&token), Err(TokenError::Invalid));
    }
}
