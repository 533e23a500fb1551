// ============================
// linkbranch-backend/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod cookies;
pub mod password;
pub mod rate_limit;
mod service;
pub mod token;

pub use cookies::{set_cookie_headers, CookiePolicy, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
pub use password::{verify_password, CredentialHasher, HashedPassword};
pub use rate_limit::AuthRateLimiter;
pub use service::{AccountService, Login, Registration};
pub use token::{AccessClaims, RefreshClaims, TokenError, TokenService};
