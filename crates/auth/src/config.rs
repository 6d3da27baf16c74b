//! Process-wide authentication configuration.
//!
//! Built once at startup and shared by reference; nothing in the core re-reads
//! the environment per call.

use chrono::Duration;
use jsonwebtoken::Algorithm;
use thiserror::Error;

pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_ALGORITHM: &str = "ALGORITHM";
pub const ENV_TOKEN_EXPIRE_MINUTES: &str = "ACCESS_TOKEN_EXPIRE_MINUTE";
pub const ENV_HASH_MEMORY_KIB: &str = "PASSWORD_HASH_MEMORY_KIB";
pub const ENV_HASH_ITERATIONS: &str = "PASSWORD_HASH_ITERATIONS";
pub const ENV_HASH_PARALLELISM: &str = "PASSWORD_HASH_PARALLELISM";

const DEFAULT_TOKEN_EXPIRE_MINUTES: i64 = 30;
/// One year.
const MAX_TOKEN_EXPIRE_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{ENV_SECRET_KEY} is not set; refusing to start without a signing key")]
    MissingSecret,

    #[error("unsupported signing algorithm '{0}' (expected one of HS256, HS384, HS512)")]
    UnsupportedAlgorithm(String),

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("invalid password hashing parameters: {0}")]
    InvalidHashParams(String),
}

/// Argon2 work factor.
///
/// Defaults follow the OWASP baseline for Argon2id (19 MiB, 2 passes, 1 lane).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Signing key, algorithm, token validity and hashing cost.
#[derive(Clone)]
pub struct AuthConfig {
    signing_secret: String,
    algorithm: Algorithm,
    token_validity: Duration,
    hashing: HashingConfig,
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("token_validity", &self.token_validity)
            .field("hashing", &self.hashing)
            .finish()
    }
}

impl AuthConfig {
    /// Build a config with default validity and hashing cost.
    ///
    /// An empty secret is rejected the same way a missing one is.
    pub fn new(signing_secret: impl Into<String>, algorithm: Algorithm) -> Result<Self, ConfigError> {
        let signing_secret = signing_secret.into();
        if signing_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        ensure_hmac(algorithm)?;
        Ok(Self {
            signing_secret,
            algorithm,
            token_validity: Duration::minutes(DEFAULT_TOKEN_EXPIRE_MINUTES),
            hashing: HashingConfig::default(),
        })
    }

    pub fn with_token_validity(mut self, validity: Duration) -> Self {
        self.token_validity = validity;
        self
    }

    pub fn with_hashing(mut self, hashing: HashingConfig) -> Self {
        self.hashing = hashing;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_SECRET_KEY).ok_or(ConfigError::MissingSecret)?;

        let algorithm = match lookup(ENV_ALGORITHM) {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS256,
        };

        let minutes: i64 = parse_or(&lookup, ENV_TOKEN_EXPIRE_MINUTES, DEFAULT_TOKEN_EXPIRE_MINUTES)?;
        let validity = (1..=MAX_TOKEN_EXPIRE_MINUTES)
            .contains(&minutes)
            .then(|| Duration::try_minutes(minutes))
            .flatten()
            .ok_or_else(|| ConfigError::Invalid {
                key: ENV_TOKEN_EXPIRE_MINUTES,
                value: minutes.to_string(),
            })?;

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse_or(&lookup, ENV_HASH_MEMORY_KIB, defaults.memory_kib)?,
            iterations: parse_or(&lookup, ENV_HASH_ITERATIONS, defaults.iterations)?,
            parallelism: parse_or(&lookup, ENV_HASH_PARALLELISM, defaults.parallelism)?,
        };

        Ok(Self::new(secret, algorithm)?
            .with_token_validity(validity)
            .with_hashing(hashing))
    }

    pub fn signing_secret(&self) -> &[u8] {
        self.signing_secret.as_bytes()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn token_validity(&self) -> Duration {
        self.token_validity
    }

    pub fn hashing(&self) -> &HashingConfig {
        &self.hashing
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm: Algorithm = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::UnsupportedAlgorithm(raw.to_string()))?;
    ensure_hmac(algorithm)?;
    Ok(algorithm)
}

// The key is a shared secret, so only the HMAC family makes sense.
fn ensure_hmac(algorithm: Algorithm) -> Result<(), ConfigError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(()),
        other => Err(ConfigError::UnsupportedAlgorithm(format!("{other:?}"))),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
