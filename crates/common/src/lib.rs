// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between `LinkBranch` clients and the server.
//! This module defines the JSON request bodies, the response envelopes and
//! the redacted user/link projections the API hands out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of links a single user may own
pub const MAX_LINKS_PER_USER: usize = 6;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /auth/register`
/// # Fields
/// * `fullname` - Display name
/// * `username` - Public handle (max 25 chars)
/// * `email` - Contact address, unique per account
/// * `password` - Plaintext password (min 4 chars), hashed before storage
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`
/// # Fields
/// * `identity` - Either the email or the username
/// * `password` - Plaintext password
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub identity: String,
    pub password: String,
}

/// Body of `POST /user/links`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AddLinkRequest {
    /// Platform name, stored as the link title
    #[serde(alias = "title")]
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
}

/// Body of `PUT /links/{linkId}`; absent fields are left untouched
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub background_image: Option<String>,
}

/// Body of `PUT /user/links/order`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ReorderLinksRequest {
    /// Every link id owned by the caller, in the desired display order
    pub link_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// User summary returned right after registration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Redacted user view safe for unauthenticated visitors
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub profile_pic: String,
    pub bio: String,
}

/// Redacted user view for the owner of the account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub profile_pic: String,
    pub visit_count: u64,
    /// Present on every view that embeds the link collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkView>>,
}

/// A single link as shown to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub order: u32,
    pub clicks: u64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the link listing endpoints
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserLinks {
    pub user_details: PublicProfile,
    pub links: Vec<LinkView>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Plain acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Response to a successful registration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub data: RegisteredUser,
}

/// Response to a successful login; the token is also set as a cookie
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
}

/// Response carrying the caller's own profile
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: OwnProfile,
}

/// Response carrying a single link
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LinkResponse {
    pub success: bool,
    pub message: String,
    pub data: LinkView,
}

/// Response of the link listing endpoints
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserLinksResponse {
    pub success: bool,
    pub message: String,
    pub data: UserLinks,
}

/// Response to a visit counter increment
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub success: bool,
    pub message: String,
    pub visit_count: u64,
}

/// Response to an avatar upload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageResponse {
    pub success: bool,
    pub message: String,
    pub image: String,
}

/// One rejected input field
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Uniform failure envelope
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    /// Stable machine-readable error code
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}
