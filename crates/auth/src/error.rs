//! Failure taxonomy of the authentication/authorization core.
//!
//! Every variant maps to exactly one externally observable outcome; the
//! routing layer owns the transport representation.

use thiserror::Error;

use stockroom_core::{DomainError, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown handle or wrong secret (indistinguishable on purpose).
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// Malformed, forged or expired token (indistinguishable on purpose).
    #[error("invalid authentication credentials")]
    InvalidToken,

    /// Token verified but the identity it names no longer exists.
    #[error("user not found")]
    IdentityNotFound,

    /// Authenticated, but not the owner of the resource being mutated.
    #[error("not authorized to modify this resource")]
    Forbidden,

    #[error("resource not found")]
    NotFound,

    #[error("username already taken")]
    DuplicateHandle,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AuthError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::BadRequest(msg),
        }
    }
}
