use serde::{Deserialize, Serialize};

use stockroom_auth::Owned;
use stockroom_core::{DomainError, DomainResult, Entity, ProductId, UserId, error::ensure_len};

pub const NAME_MAX_LEN: usize = 100;
pub const KIND_MAX_LEN: usize = 50;
pub const SKU_MAX_LEN: usize = 50;
pub const IMAGE_URL_MAX_LEN: usize = 255;

/// A stored product record.
///
/// `created_by` is the ownership link: set once at creation, never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub created_by: UserId,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Owned for Product {
    fn owner_id(&self) -> UserId {
        self.created_by
    }
}

/// Fields supplied when creating a product.
///
/// SKUs are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sku: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_len("name", &self.name, 1, NAME_MAX_LEN)?;
        ensure_len("type", &self.kind, 1, KIND_MAX_LEN)?;
        ensure_len("sku", &self.sku, 1, SKU_MAX_LEN)?;
        if let Some(url) = &self.image_url {
            ensure_len("image_url", url, 0, IMAGE_URL_MAX_LEN)?;
        }
        validate_quantity(self.quantity)?;
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(DomainError::validation("price must be greater than 0"));
        }
        Ok(())
    }

    /// Attach storage-assigned id and owner.
    pub fn into_product(self, id: ProductId, owner: UserId) -> Product {
        Product {
            id,
            name: self.name,
            kind: self.kind,
            sku: self.sku,
            image_url: self.image_url,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            created_by: owner,
        }
    }
}

pub fn validate_quantity(quantity: i64) -> DomainResult<()> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity must be greater than or equal to 0"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_draft() -> NewProduct {
    NewProduct {
        name: "Gaming Laptop".to_string(),
        kind: "Electronics".to_string(),
        sku: "GLT-001".to_string(),
        image_url: Some("https://example.com/gaming-laptop.jpg".to_string()),
        description: Some("High-performance gaming laptop".to_string()),
        quantity: 50,
        price: 1299.99,
    }
}
