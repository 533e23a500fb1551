// ============================
// linkbranch-backend/src/auth/cookies.rs
// ============================
//! Session cookie construction.
use axum::http::{header::SET_COOKIE, HeaderName};
use axum::response::AppendHeaders;
use cookie::{time::Duration, Cookie, CookieBuilder, SameSite};

use super::token::TokenService;
use crate::config::{CookieSettings, SameSitePolicy};

/// Cookie carrying the access token
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

/// Attributes shared by every session cookie.
///
/// Removal cookies are built from the same attributes as the cookies that set
/// the tokens; browsers ignore a removal whose path or flags differ.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
    access_max_age: Duration,
    refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(settings: &CookieSettings, tokens: &TokenService) -> Self {
        Self {
            secure: settings.secure,
            same_site: settings.same_site.into(),
            access_max_age: to_cookie_duration(tokens.access_ttl()),
            refresh_max_age: to_cookie_duration(tokens.refresh_ttl()),
        }
    }

    fn base(&self, name: &'static str, value: String) -> CookieBuilder<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
    }

    pub fn access_cookie(&self, token: String) -> Cookie<'static> {
        self.base(ACCESS_COOKIE_NAME, token)
            .max_age(self.access_max_age)
            .build()
    }

    pub fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        self.base(REFRESH_COOKIE_NAME, token)
            .max_age(self.refresh_max_age)
            .build()
    }

    /// Cookies that clear both session cookies
    pub fn removal_cookies(&self) -> [Cookie<'static>; 2] {
        [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME].map(|name| {
            let mut cookie = self.base(name, String::new()).build();
            cookie.make_removal();
            cookie
        })
    }
}

/// Turn cookies into `Set-Cookie` response headers
pub fn set_cookie_headers<I>(cookies: I) -> AppendHeaders<Vec<(HeaderName, String)>>
where
    I: IntoIterator<Item = Cookie<'static>>,
{
    AppendHeaders(
        cookies
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie.to_string()))
            .collect(),
    )
}

fn to_cookie_duration(ttl: std::time::Duration) -> Duration {
    Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}
