//! Application configuration, read once at startup.

use std::net::SocketAddr;

use thiserror::Error;

use stockroom_auth::{AuthConfig, ConfigError};

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error(transparent)]
    Auth(#[from] ConfigError),

    #[error("invalid value for {ENV_BIND_ADDR}: '{0}'")]
    InvalidBindAddr(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub bind_addr: SocketAddr,
    /// Postgres connection string. `None` selects the in-memory stores.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth = AuthConfig::from_lookup(&lookup)?;

        let raw_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| AppConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let database_url = lookup(ENV_DATABASE_URL).filter(|url| !url.trim().is_empty());

        Ok(Self {
            auth,
            bind_addr,
            database_url,
        })
    }
}
