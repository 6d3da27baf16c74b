//! Credential store: salted, slow one-way hashing of user secrets.

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};

use crate::config::{ConfigError, HashingConfig};
use crate::error::AuthError;

const SALT_LEN: usize = 16;

/// Argon2id hasher with a fixed work factor.
///
/// Digests are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so
/// each digest carries its own parameters and stays verifiable after the
/// configured cost changes.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    // Verified against when a handle is unknown, so lookups for missing and
    // existing users cost the same.
    dummy_digest: String,
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    pub fn new(config: &HashingConfig) -> Result<Self, ConfigError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| ConfigError::InvalidHashParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let dummy_digest = hash_with(&argon2, "stockroom-timing-equalizer")
            .map_err(|e| ConfigError::InvalidHashParams(e.to_string()))?;

        Ok(Self { argon2, dummy_digest })
    }

    /// Hash a secret with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, secret)
    }

    /// Check a secret against a stored digest.
    ///
    /// The final comparison is constant time. Malformed digests yield `false`.
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self.argon2.verify_password(secret.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Spend the same work as a real verification and report failure.
    pub fn verify_unknown(&self, secret: &str) -> bool {
        let _ = self.verify(secret, &self.dummy_digest);
        false
    }
}

fn hash_with(argon2: &Argon2<'_>, secret: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
    let phc = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

#[cfg(test)]
pub(crate) fn test_hashing() -> HashingConfig {
    HashingConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}
