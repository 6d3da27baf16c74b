//! Catalog operations.
//!
//! Every operation takes the already-resolved acting identity as a plain
//! parameter; nothing here knows about requests or tokens.

use thiserror::Error;
use tracing::info;

use stockroom_auth::{AuthError, Operation, authorize, authorize_access};
use stockroom_core::{DomainError, ProductId, StoreError, UserId};

use crate::page::{PageRequest, ProductPage};
use crate::product::{NewProduct, Product, validate_quantity};
use crate::store::ProductStore;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct Catalog<S> {
    store: S,
}

impl<S> Catalog<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(&self, actor: UserId, draft: NewProduct) -> Result<Product, CatalogError> {
        authorize_access(actor, Operation::Create)?;
        draft.validate()?;
        let product = self.store.insert(actor, draft).await?;
        info!(product_id = %product.id, owner = %actor, "product created");
        Ok(product)
    }

    pub async fn list(&self, actor: UserId, page: PageRequest) -> Result<ProductPage, CatalogError> {
        authorize_access(actor, Operation::List)?;
        page.validate()?;
        let total = self.store.count().await?;
        let products = self.store.list(page.offset(), page.limit()).await?;
        Ok(ProductPage {
            products,
            total,
            page: page.page,
            size: page.size,
            total_pages: page.total_pages(total),
        })
    }

    pub async fn get(&self, actor: UserId, id: ProductId) -> Result<Product, CatalogError> {
        let found = self.store.find_by_id(id).await?;
        Ok(authorize(actor, Operation::Get, found)?)
    }

    /// Set a product's quantity. Owner only.
    pub async fn update_quantity(
        &self,
        actor: UserId,
        id: ProductId,
        quantity: i64,
    ) -> Result<Product, CatalogError> {
        validate_quantity(quantity)?;

        let found = self.store.find_by_id(id).await?;
        authorize(actor, Operation::Update, found)?;

        // The record may vanish between the check and the write.
        let updated = self
            .store
            .update_quantity(id, quantity)
            .await?
            .ok_or(AuthError::NotFound)?;

        info!(product_id = %id, actor = %actor, quantity, "product quantity updated");
        Ok(updated)
    }

    /// Remove a product. Owner only.
    pub async fn delete(&self, actor: UserId, id: ProductId) -> Result<(), CatalogError> {
        let found = self.store.find_by_id(id).await?;
        authorize(actor, Operation::Delete, found)?;

        if !self.store.delete(id).await? {
            return Err(AuthError::NotFound.into());
        }

        info!(product_id = %id, actor = %actor, "product deleted");
        Ok(())
    }
}
