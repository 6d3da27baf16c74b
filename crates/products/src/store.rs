//! Persistence seam for product records.

use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::{ProductId, StoreError, UserId};

use crate::product::{NewProduct, Product};

/// Durable storage of products.
///
/// Single-record mutations must be atomic in the backend (one statement or
/// one critical section); the catalog holds no locks of its own.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, owner: UserId, draft: NewProduct) -> Result<Product, StoreError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    /// Returns the updated record, or `None` if it no longer exists.
    async fn update_quantity(&self, id: ProductId, quantity: i64) -> Result<Option<Product>, StoreError>;
    /// Returns `false` if there was nothing to delete.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    /// Products ordered by id.
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, owner: UserId, draft: NewProduct) -> Result<Product, StoreError> {
        (**self).insert(owner, draft).await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn update_quantity(&self, id: ProductId, quantity: i64) -> Result<Option<Product>, StoreError> {
        (**self).update_quantity(id, quantity).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        (**self).list(offset, limit).await
    }
}
