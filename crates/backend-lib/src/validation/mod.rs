// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation module.

use linkbranch_common::{FieldError, LoginRequest, RegisterRequest};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_USERNAME_LENGTH: usize = 25;
const MIN_PASSWORD_LENGTH: usize = 4;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_FULLNAME_LENGTH: usize = 100;

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s/\\?#<>@]+$").unwrap());
static LINK_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://.+\..+").unwrap());

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid fullname: {0}")]
    InvalidFullname(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
}

impl ValidationError {
    /// Name of the request field that was rejected
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidFullname(_) => "fullname",
            ValidationError::InvalidUsername(_) => "username",
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::InvalidPassword(_) => "password",
            ValidationError::InvalidIdentity(_) => "identity",
        }
    }

    fn detail(&self) -> &str {
        match self {
            ValidationError::InvalidFullname(m)
            | ValidationError::InvalidUsername(m)
            | ValidationError::InvalidEmail(m)
            | ValidationError::InvalidPassword(m)
            | ValidationError::InvalidIdentity(m) => m,
        }
    }

    /// Wire representation used in 422 responses
    pub fn to_field_error(&self) -> FieldError {
        FieldError {
            field: self.field().to_string(),
            message: self.detail().to_string(),
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a full name
pub fn validate_fullname(fullname: &str) -> ValidationResult<&str> {
    let fullname = fullname.trim();
    if fullname.is_empty() {
        return Err(ValidationError::InvalidFullname(
            "Full name is required".to_string(),
        ));
    }

    if fullname.chars().count() > MAX_FULLNAME_LENGTH {
        return Err(ValidationError::InvalidFullname(format!(
            "Full name cannot exceed {MAX_FULLNAME_LENGTH} characters"
        )));
    }

    Ok(fullname)
}

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::InvalidUsername(
            "Username is required".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername("Username too lengthy".to_string()));
    }

    // Usernames end up in public URL paths
    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username contains invalid characters".to_string(),
        ));
    }

    Ok(username)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let email = email.trim();
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail("Invalid Email".to_string()));
    }

    Ok(email)
}

/// Validate a password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password should be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate a registration request, collecting every failing field
pub fn validate_registration(req: &RegisterRequest) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = [
        validate_fullname(&req.fullname).err(),
        validate_username(&req.username).err(),
        validate_email(&req.email).err(),
        validate_password(&req.password).err(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a login request, collecting every failing field
pub fn validate_login(req: &LoginRequest) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if req.identity.trim().is_empty() {
        errors.push(ValidationError::InvalidIdentity(
            "Username/Email is required".to_string(),
        ));
    }

    if req.password.is_empty() {
        errors.push(ValidationError::InvalidPassword("Password is required".to_string()));
    } else if let Err(e) = validate_password(&req.password) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check the minimal `scheme://host.tld` shape every link URL must have
pub fn is_valid_link_url(url: &str) -> bool {
    LINK_URL_REGEX.is_match(url)
}
