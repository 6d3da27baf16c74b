//! Identity resolver: registration, login and per-request token resolution.
//!
//! Every request starts unauthenticated and resolves independently; nothing
//! here caches identities between calls.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use stockroom_core::StoreError;

use crate::config::{AuthConfig, ConfigError};
use crate::credentials::CredentialHasher;
use crate::error::AuthError;
use crate::identity::{Identity, IdentityStore, validate_handle, validate_secret};
use crate::token::{IssuedToken, TokenCodec};

#[derive(Debug)]
pub struct IdentityResolver<S> {
    store: S,
    hasher: Arc<CredentialHasher>,
    codec: TokenCodec,
    token_validity: Duration,
}

impl<S> IdentityResolver<S>
where
    S: IdentityStore,
{
    pub fn new(store: S, config: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            hasher: Arc::new(CredentialHasher::new(config.hashing())?),
            codec: TokenCodec::new(config),
            token_validity: config.token_validity(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create a new identity.
    ///
    /// The pre-check gives a fast answer; the store's uniqueness guarantee
    /// settles races between concurrent registrations of the same handle.
    pub async fn register(&self, handle: &str, secret: &str) -> Result<Identity, AuthError> {
        validate_handle(handle)?;
        validate_secret(secret)?;

        if self.store.find_by_handle(handle).await?.is_some() {
            debug!(%handle, "registration rejected: handle taken");
            return Err(AuthError::DuplicateHandle);
        }

        let digest = self.hash_secret(secret).await?;
        match self.store.insert(handle, &digest).await {
            Ok(identity) => {
                info!(user_id = %identity.id, %handle, "identity registered");
                Ok(identity)
            }
            Err(StoreError::UniqueViolation(_)) => {
                debug!(%handle, "registration rejected: handle taken concurrently");
                Err(AuthError::DuplicateHandle)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a handle/secret pair.
    ///
    /// Unknown handle and wrong secret are reported identically.
    pub async fn authenticate(&self, handle: &str, secret: &str) -> Result<Identity, AuthError> {
        let identity = self.store.find_by_handle(handle).await?;
        let verified = self
            .verify_secret(secret, identity.as_ref().map(|i| i.digest.clone()))
            .await?;

        match identity {
            Some(identity) if verified => Ok(identity),
            _ => {
                warn!("authentication failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Authenticate and mint a session token.
    pub async fn login(&self, handle: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        let identity = self.authenticate(handle, secret).await?;
        let token = self.codec.issue(identity.id, self.token_validity)?;
        info!(user_id = %identity.id, expires_at = %token.expires_at, "session issued");
        Ok(token)
    }

    // Argon2 work runs on the blocking pool, not on the async workers.
    async fn hash_secret(&self, secret: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    /// Verify against `digest`, or against the dummy digest when the handle
    /// is unknown (always `false`).
    async fn verify_secret(&self, secret: &str, digest: Option<String>) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&secret, &digest),
            None => hasher.verify_unknown(&secret),
        })
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }

    /// Recover the acting identity from a presented token.
    ///
    /// The identity is always re-loaded from storage; a valid token for a
    /// removed identity yields [`AuthError::IdentityNotFound`].
    pub async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.decode(token)?;
        match self.store.find_by_id(claims.user_id).await? {
            Some(identity) => Ok(identity),
            None => {
                debug!(user_id = %claims.user_id, "token names a missing identity");
                Err(AuthError::IdentityNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use jsonwebtoken::Algorithm;

    use stockroom_core::UserId;

    use super::*;
    use crate::credentials::test_hashing;

    #[derive(Default)]
    struct VecStore {
        rows: Mutex<Vec<Identity>>,
    }

    impl VecStore {
        fn remove(&self, id: UserId) {
            self.rows.lock().unwrap().retain(|i| i.id != id);
        }
    }

    #[async_trait]
    impl IdentityStore for VecStore {
        async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, StoreError> {
            Ok(self.rows.lock().unwrap().iter().find(|i| i.handle == handle).cloned())
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
            Ok(self.rows.lock().unwrap().iter().find(|i| i.id == id).cloned())
        }

        async fn insert(&self, handle: &str, digest: &str) -> Result<Identity, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|i| i.handle == handle) {
                return Err(StoreError::UniqueViolation(handle.to_string()));
            }
            let identity = Identity {
                id: UserId::new(rows.len() as i64 + 1),
                handle: handle.to_string(),
                digest: digest.to_string(),
            };
            rows.push(identity.clone());
            Ok(identity)
        }

        async fn list(&self) -> Result<Vec<Identity>, StoreError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    fn resolver() -> IdentityResolver<VecStore> {
        let config = AuthConfig::new("resolver-secret", Algorithm::HS256)
            .unwrap()
            .with_hashing(test_hashing());
        IdentityResolver::new(VecStore::default(), &config).unwrap()
    }

    #[tokio::test]
    async fn register_once_then_duplicate() {
        let r = resolver();
        let alice = r.register("alice", "pw12345").await.unwrap();
        assert_eq!(alice.handle, "alice");
        assert_ne!(alice.digest, "pw12345");

        assert_eq!(r.register("alice", "other-pw").await, Err(AuthError::DuplicateHandle));
    }

    #[tokio::test]
    async fn handles_are_case_sensitive() {
        let r = resolver();
        r.register("alice", "pw12345").await.unwrap();
        assert!(r.register("Alice", "pw12345").await.is_ok());
        assert_eq!(
            r.authenticate("ALICE", "pw12345").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn register_validates_input() {
        let r = resolver();
        assert!(matches!(r.register("al", "pw12345").await, Err(AuthError::BadRequest(_))));
        assert!(matches!(r.register("alice", "pw").await, Err(AuthError::BadRequest(_))));
    }

    #[tokio::test]
    async fn store_level_collision_maps_to_duplicate() {
        let r = resolver();
        // Simulate a concurrent insert that lands between pre-check and insert.
        r.store().insert("carol", "digest").await.unwrap();
        let err = r.store().insert("carol", "digest").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(r.register("carol", "pw12345").await, Err(AuthError::DuplicateHandle));
    }

    #[tokio::test]
    async fn unknown_handle_and_wrong_secret_look_the_same() {
        let r = resolver();
        r.register("alice", "pw12345").await.unwrap();

        let wrong_secret = r.authenticate("alice", "wrong").await.unwrap_err();
        let unknown = r.authenticate("mallory", "pw12345").await.unwrap_err();
        assert_eq!(wrong_secret, AuthError::InvalidCredentials);
        assert_eq!(wrong_secret, unknown);
        assert_eq!(wrong_secret.to_string(), unknown.to_string());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_thread_free() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let r = resolver();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                loop {
                    ticks.fetch_add(1, Ordering::Relaxed);
                    tokio::task::yield_now().await;
                }
            }
        });

        r.register("alice", "pw12345").await.unwrap();
        let during_register = ticks.load(Ordering::Relaxed);
        r.login("alice", "pw12345").await.unwrap();
        ticker.abort();

        // On a single-threaded runtime the ticker only runs while the
        // resolver is parked on a blocking task.
        assert!(during_register > 0);
        assert!(ticks.load(Ordering::Relaxed) > during_register);
    }

    #[tokio::test]
    async fn login_then_resolve() {
        let r = resolver();
        let alice = r.register("alice", "pw12345").await.unwrap();

        let token = r.login("alice", "pw12345").await.unwrap();
        assert_eq!(token.token_type, "bearer");

        let resolved = r.resolve(&token.access_token).await.unwrap();
        assert_eq!(resolved.id, alice.id);
        assert_eq!(resolved.handle, "alice");
    }

    #[tokio::test]
    async fn resolve_after_identity_removed_is_not_found() {
        let r = resolver();
        let alice = r.register("alice", "pw12345").await.unwrap();
        let token = r.login("alice", "pw12345").await.unwrap();

        r.store().remove(alice.id);

        assert_eq!(
            r.resolve(&token.access_token).await,
            Err(AuthError::IdentityNotFound)
        );
    }

    #[tokio::test]
    async fn resolve_rejects_bad_tokens() {
        let r = resolver();
        assert_eq!(r.resolve("not-a-token").await, Err(AuthError::InvalidToken));

        let alice = r.register("alice", "pw12345").await.unwrap();
        let expired = r.codec().issue(alice.id, Duration::minutes(-1)).unwrap();
        assert_eq!(r.resolve(&expired.access_token).await, Err(AuthError::InvalidToken));
    }
}
