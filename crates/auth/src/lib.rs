//! `stockroom-auth`: authentication/authorization core.
//!
//! Credential hashing, signed session tokens, identity resolution and the
//! single-owner authorization rule. This crate is decoupled from HTTP; storage
//! is reached only through the [`IdentityStore`] seam.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod token;

pub use authorize::{Operation, Owned, authorize, authorize_access, can_mutate};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use config::{AuthConfig, ConfigError, HashingConfig};
pub use credentials::CredentialHasher;
pub use error::AuthError;
pub use identity::{Identity, IdentityStore};
pub use resolver::IdentityResolver;
pub use token::{IssuedToken, TokenCodec};
