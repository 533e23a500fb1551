// ============================
// linkbranch-backend/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "LINKBRANCH_";

/// Directory under the storage root that holds uploaded avatars
pub const UPLOADS_DIR: &str = "uploads";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub cookies: CookieSettings,
    pub rate_limit: RateLimitSettings,
    pub uploads: UploadSettings,
    pub cors: CorsSettings,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Prefix every API route is nested under
    pub api_prefix: String,
}

/// Flat-file storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub path: PathBuf,
}

/// Token and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    /// scrypt `log_n` cost parameter
    pub hash_cost: u8,
}

/// `SameSite` attribute applied to the session cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

/// Session cookie attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSitePolicy,
}

/// Login throttling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Failed logins before an identity is locked out
    pub max_attempts: u32,
    pub lockout_secs: u64,
}

/// Avatar upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Origin the `/uploads` directory is reachable under
    pub public_base_url: String,
}

/// Cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            cookies: CookieSettings::default(),
            rate_limit: RateLimitSettings::default(),
            uploads: UploadSettings::default(),
            cors: CorsSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_prefix: "/api/v1".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl_secs: 60 * 60,           // 1 hour
            refresh_token_ttl_secs: 5 * 24 * 60 * 60, // 5 days
            hash_cost: 15,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSitePolicy::None,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            public_base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from the given TOML file (if present) and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("failed to load settings from {}", path.as_ref().display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.server.host, self.server.port))
    }

    /// Directory uploaded avatars are written to and served from
    pub fn uploads_dir(&self) -> PathBuf {
        self.storage.path.join(UPLOADS_DIR)
    }

    /// Reject settings the server cannot run safely with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("invalid log level: {}", self.log_level);
        }

        let auth = &self.auth;
        if auth.access_token_secret.is_empty() || auth.refresh_token_secret.is_empty() {
            bail!("access and refresh token secrets must be set");
        }
        if auth.access_token_secret == auth.refresh_token_secret {
            bail!("access and refresh token secrets must differ");
        }
        if auth.access_token_ttl_secs == 0 || auth.refresh_token_ttl_secs == 0 {
            bail!("token TTLs must be positive");
        }
        if !(1..=20).contains(&auth.hash_cost) {
            bail!("hash_cost must be between 1 and 20, got {}", auth.hash_cost);
        }

        if self.cookies.same_site == SameSitePolicy::None && !self.cookies.secure {
            bail!("SameSite=None cookies must be secure");
        }

        if self.rate_limit.max_attempts == 0 {
            bail!("rate_limit.max_attempts must be positive");
        }

        if !self.server.api_prefix.is_empty() && !self.server.api_prefix.starts_with('/') {
            bail!("api_prefix must start with '/'");
        }

        Ok(())
    }
}
