//! Storage-layer error shared by the persistence seams.

use thiserror::Error;

/// Failure reported by a storage backend.
///
/// Backends map their native failures into these two kinds; callers only
/// ever need to distinguish a uniqueness collision from everything else.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other backend failure (connection, decoding, poisoned lock, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
