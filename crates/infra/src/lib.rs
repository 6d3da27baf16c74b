//! Infrastructure layer: storage backends and database wiring.

pub mod db;
pub mod store;

pub use store::{InMemoryIdentityStore, InMemoryProductStore, PostgresIdentityStore, PostgresProductStore};
