//! Identity record and the persistence seam the core reads it through.

use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::{DomainResult, Entity, StoreError, UserId, error::ensure_len};

pub const HANDLE_MIN_LEN: usize = 3;
pub const HANDLE_MAX_LEN: usize = 50;
pub const SECRET_MIN_LEN: usize = 3;
pub const SECRET_MAX_LEN: usize = 255;

/// A registered user.
///
/// `handle` is unique and compared case-sensitively. `digest` is the stored
/// credential hash, never the plaintext secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub handle: String,
    pub digest: String,
}

impl core::fmt::Debug for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Entity for Identity {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Validate a registration handle.
pub fn validate_handle(handle: &str) -> DomainResult<()> {
    ensure_len("username", handle, HANDLE_MIN_LEN, HANDLE_MAX_LEN)
}

/// Validate a registration secret.
pub fn validate_secret(secret: &str) -> DomainResult<()> {
    ensure_len("password", secret, SECRET_MIN_LEN, SECRET_MAX_LEN)
}

/// Durable storage of identities.
///
/// `insert` must enforce handle uniqueness atomically and report collisions as
/// [`StoreError::UniqueViolation`].
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, StoreError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError>;
    async fn insert(&self, handle: &str, digest: &str) -> Result<Identity, StoreError>;
    /// All identities, ordered by id.
    async fn list(&self) -> Result<Vec<Identity>, StoreError>;
}

#[async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_handle(handle).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, handle: &str, digest: &str) -> Result<Identity, StoreError> {
        (**self).insert(handle, digest).await
    }

    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        (**self).list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_bounds() {
        assert!(validate_handle("al").is_err());
        assert!(validate_handle("alice").is_ok());
        assert!(validate_handle(&"a".repeat(51)).is_err());
    }

    #[test]
    fn secret_bounds() {
        assert!(validate_secret("pw").is_err());
        assert!(validate_secret("pw12345").is_ok());
        assert!(validate_secret(&"x".repeat(256)).is_err());
    }

    #[test]
    fn debug_hides_digest() {
        let identity = Identity {
            id: UserId::new(1),
            handle: "alice".into(),
            digest: "$argon2id$secret-material".into(),
        };
        assert!(!format!("{identity:?}").contains("secret-material"));
    }
}
