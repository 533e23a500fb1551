// ============================
// linkbranch-backend/src/auth/password.rs
// ============================
//! Password hashing and verification.
use std::fmt;

use anyhow::anyhow;
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_OUTPUT_LEN: usize = 32;

/// A salted scrypt digest in PHC string format.
///
/// The only way to obtain one outside of deserialization is
/// [`CredentialHasher::hash`], so a user record can never be written with a
/// plaintext password in it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(..)")
    }
}

/// Hashes and verifies passwords with a configured scrypt cost
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher with the given scrypt `log_n` cost
    pub fn new(log_n: u8) -> anyhow::Result<Self> {
        let params = Params::new(log_n, SCRYPT_R, SCRYPT_P, SCRYPT_OUTPUT_LEN)
            .map_err(|e| anyhow!("invalid scrypt parameters: {e}"))?;
        Ok(Self { params })
    }

    /// Hash a password using scrypt
    pub fn hash_password(&self, plain: &str) -> anyhow::Result<HashedPassword> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params.clone(), &salt)?
            .to_string();
        Ok(HashedPassword(hash))
    }

    /// Hash on the blocking pool and zeroize the plaintext afterwards
    pub async fn hash(&self, mut plain: String) -> anyhow::Result<HashedPassword> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || {
            let hashed = hasher.hash_password(&plain);
            plain.zeroize();
            hashed
        })
        .await?
    }

    /// Verify on the blocking pool and zeroize the plaintext afterwards
    pub async fn verify(&self, hash: HashedPassword, mut plain: String) -> anyhow::Result<bool> {
        let matches = tokio::task::spawn_blocking(move || {
            let ok = verify_password(hash.as_str(), &plain);
            plain.zeroize();
            ok
        })
        .await?;
        Ok(matches)
    }
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}
