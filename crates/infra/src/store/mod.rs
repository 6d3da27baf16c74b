//! Implementations of the identity and product persistence seams.
//!
//! The in-memory backend serves tests and local development; the Postgres
//! backend is used whenever a database URL is configured.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryIdentityStore, InMemoryProductStore};
pub use postgres::{PostgresIdentityStore, PostgresProductStore};
