// ==============
// crates/backend-lib/src/telemetry.rs

//! Central place for metric keys
pub const USER_REGISTERED: &str = "user.registered";
pub const LOGIN_SUCCEEDED: &str = "login.succeeded";
pub const LOGIN_FAILED: &str = "login.failed";
pub const LINK_ADDED: &str = "link.added";
pub const LINK_DELETED: &str = "link.deleted";
pub const PROFILE_VISIT: &str = "profile.visit";
