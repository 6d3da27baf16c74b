//! Products domain module.
//!
//! Product records, draft validation, pagination and the catalog operations.
//! Storage is reached only through the [`ProductStore`] seam; ownership rules
//! come from `stockroom-auth`.

pub mod catalog;
pub mod page;
pub mod product;
pub mod store;

pub use catalog::{Catalog, CatalogError};
pub use page::{PageRequest, ProductPage};
pub use product::{NewProduct, Product};
pub use store::ProductStore;
