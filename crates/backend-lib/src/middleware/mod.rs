// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `LinkBranch` API.

pub mod session;

pub use session::{authenticate, require_session, AuthContext};
