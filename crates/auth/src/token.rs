//! Token codec: issues and verifies signed, time-limited session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use stockroom_core::UserId;

use crate::claims::{SessionClaims, validate_claims};
use crate::config::AuthConfig;
use crate::error::AuthError;

pub const TOKEN_TYPE: &str = "bearer";

/// A freshly minted access token, as handed back to a client after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    #[serde(skip)]
    pub expires_at: DateTime<Utc>,
}

/// HMAC-signed JWT codec.
///
/// Keys are derived once from [`AuthConfig`] and never change for the life of
/// the codec.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let algorithm = config.algorithm();

        // Expiry is checked by `validate_claims` against an explicit `now`,
        // with zero leeway; the library only enforces that `exp` is present.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            algorithm,
            encoding: EncodingKey::from_secret(config.signing_secret()),
            decoding: DecodingKey::from_secret(config.signing_secret()),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for `validity` from now.
    pub fn issue(&self, user_id: UserId, validity: Duration) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, validity, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: UserId,
        validity: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims::new(user_id, now, validity)
            .ok_or_else(|| AuthError::Internal(format!("token validity {validity} overflows expiry")))?;
        let access_token = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))?;

        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE,
            expires_at: claims.expires_at,
        })
    }

    /// Verify signature, parse payload, then check expiry.
    ///
    /// Every failure collapses into [`AuthError::InvalidToken`].
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(reason = %e, "token rejected");
                AuthError::InvalidToken
            })?;

        validate_claims(&data.claims, now).map_err(|e| {
            tracing::debug!(reason = %e, user_id = %data.claims.user_id, "token rejected");
            AuthError::InvalidToken
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new("unit-test-secret", Algorithm::HS256).unwrap())
    }

    #[test]
    fn issue_then_decode_recovers_identity_and_expiry() {
        let codec = codec();
        let before = Utc::now();
        let issued = codec.issue(UserId::new(42), Duration::minutes(30)).unwrap();
        let claims = codec.decode(&issued.access_token).unwrap();

        assert_eq!(claims.user_id, UserId::new(42));
        assert_eq!(claims.expires_at, issued.expires_at);
        let expected = before + Duration::minutes(30);
        assert!((claims.expires_at - expected).num_seconds().abs() <= 1);
        assert_eq!(issued.token_type, "bearer");
    }

    #[test]
    fn already_expired_token_is_invalid() {
        let codec = codec();
        let issued = codec.issue(UserId::new(1), Duration::minutes(-1)).unwrap();
        assert_eq!(codec.decode(&issued.access_token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_expires_once_clock_passes_expiry() {
        let codec = codec();
        let now = Utc::now();
        let issued = codec.issue_at(UserId::new(1), Duration::minutes(30), now).unwrap();
        assert!(codec.decode_at(&issued.access_token, now + Duration::minutes(29)).is_ok());
        assert_eq!(
            codec.decode_at(&issued.access_token, now + Duration::minutes(31)),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn flipped_payload_byte_is_invalid() {
        let codec = codec();
        let issued = codec.issue(UserId::new(7), Duration::minutes(5)).unwrap();
        let tampered = flip_payload_byte(&issued.access_token);
        assert_ne!(tampered, issued.access_token);
        assert_eq!(codec.decode(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_signed_with_other_key_is_invalid() {
        let other = TokenCodec::new(&AuthConfig::new("another-secret", Algorithm::HS256).unwrap());
        let issued = other.issue(UserId::new(7), Duration::minutes(5)).unwrap();
        assert_eq!(codec().decode(&issued.access_token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_with_other_algorithm_is_invalid() {
        let hs512 = TokenCodec::new(&AuthConfig::new("unit-test-secret", Algorithm::HS512).unwrap());
        let issued = hs512.issue(UserId::new(7), Duration::minutes(5)).unwrap();
        assert_eq!(codec().decode(&issued.access_token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn overflowing_validity_is_an_error_not_a_panic() {
        let huge = Duration::try_minutes(200_000_000_000).unwrap();
        assert!(matches!(
            codec().issue(UserId::new(1), huge),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = codec();
        for token in ["", "abc", "a.b.c", "....", "eyJhbGciOiJub25lIn0.e30."] {
            assert_eq!(codec.decode(token), Err(AuthError::InvalidToken), "token={token:?}");
        }
    }

    #[test]
    fn correctly_signed_payload_without_identity_is_invalid() {
        #[derive(Serialize)]
        struct NoId {
            exp: i64,
        }
        let secret = "unit-test-secret";
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &NoId { exp: (Utc::now() + Duration::minutes(5)).timestamp() },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        assert_eq!(codec().decode(&token), Err(AuthError::InvalidToken));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn decode_issue_roundtrip(id in any::<i64>(), minutes in 1i64..=10_000) {
            let codec = codec();
            let now = Utc::now();
            let issued = codec.issue_at(UserId::new(id), Duration::minutes(minutes), now).unwrap();
            let claims = codec.decode_at(&issued.access_token, now).unwrap();
            prop_assert_eq!(claims.user_id, UserId::new(id));
            prop_assert!((claims.expires_at - (now + Duration::minutes(minutes))).num_seconds().abs() <= 1);
        }
    }

    /// Replace one character in the middle segment with a different
    /// base64url character.
    fn flip_payload_byte(token: &str) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let payload = &mut parts[1];
        let mid = payload.len() / 2;
        let replacement = if payload.as_bytes()[mid] == b'A' { "B" } else { "A" };
        payload.replace_range(mid..mid + 1, replacement);
        parts.join(".")
    }
}
