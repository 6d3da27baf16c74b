//! Service wiring: storage backends behind the auth and catalog cores.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use stockroom_auth::{AuthConfig, ConfigError, IdentityResolver, IdentityStore};
use stockroom_core::StoreError;
use stockroom_infra::db::{self, DbConfig};
use stockroom_infra::{InMemoryIdentityStore, InMemoryProductStore, PostgresIdentityStore, PostgresProductStore};
use stockroom_products::{Catalog, ProductStore};

use crate::config::AppConfig;

pub type SharedIdentityStore = Arc<dyn IdentityStore>;
pub type SharedProductStore = Arc<dyn ProductStore>;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything request handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub resolver: IdentityResolver<SharedIdentityStore>,
    pub catalog: Catalog<SharedProductStore>,
}

impl AppServices {
    pub fn new(
        identities: SharedIdentityStore,
        products: SharedProductStore,
        auth: &AuthConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            resolver: IdentityResolver::new(identities, auth)?,
            catalog: Catalog::new(products),
        })
    }

    pub fn in_memory(auth: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemoryProductStore::new()),
            auth,
        )
    }
}

/// Build services for the configured backend.
///
/// With a database URL the pool is opened and the schema ensured before the
/// server accepts traffic; otherwise state lives in process memory.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServicesError> {
    match &config.database_url {
        Some(url) => {
            let pool = db::connect(&DbConfig::new(url.as_str())).await?;
            db::ensure_schema(&pool).await?;
            info!(backend = "postgres", "storage ready");
            Ok(AppServices::new(
                Arc::new(PostgresIdentityStore::new(pool.clone())),
                Arc::new(PostgresProductStore::new(pool)),
                &config.auth,
            )?)
        }
        None => {
            info!(backend = "in_memory", "storage ready");
            Ok(AppServices::in_memory(&config.auth)?)
        }
    }
}
