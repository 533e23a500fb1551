// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for login attempts.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entries kept before stale ones are swept
const CLEANUP_THRESHOLD: usize = 10_000;

/// How long a failure is remembered without a lockout
const FAILURE_MEMORY: Duration = Duration::from_secs(24 * 60 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for login attempts, keyed by the normalised login identity
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    attempts: Arc<DashMap<String, RateLimitEntry>>,
    max_attempts: u32,
    lockout_duration: Duration,
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    /// Emails fold case the way storage does; usernames are case-sensitive
    fn key(identity: &str) -> String {
        let identity = identity.trim();
        if identity.contains('@') {
            identity.to_lowercase()
        } else {
            identity.to_string()
        }
    }

    /// Record a failed login
    pub fn record_failed_attempt(&self, identity: &str) {
        if self.attempts.len() > CLEANUP_THRESHOLD {
            self.cleanup();
        }

        let now = Instant::now();
        let mut entry = self
            .attempts
            .entry(Self::key(identity))
            .or_insert_with(|| RateLimitEntry {
                failed_attempts: 0,
                last_failure: now,
                lockout_expiry: None,
            });

        // Start over once a previous lockout has run out
        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            tracing::warn!(
                attempts = entry.failed_attempts,
                lockout_secs = self.lockout_duration.as_secs(),
                "login identity locked out"
            );
        }
    }

    /// Forget failures after a successful login
    pub fn record_success(&self, identity: &str) {
        self.attempts.remove(&Self::key(identity));
    }

    /// Check if an identity is allowed to attempt a login
    pub fn check_rate_limit(&self, identity: &str) -> bool {
        match self.attempts.get(&Self::key(identity)) {
            Some(entry) => entry
                .lockout_expiry
                .map_or(true, |expiry| Instant::now() >= expiry),
            None => true,
        }
    }

    /// Remove expired lockouts and old failures
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_failure) < FAILURE_MEMORY,
        });
    }
}
