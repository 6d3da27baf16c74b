use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::UserId;

/// Session claim carried inside a signed token.
///
/// Wire shape is `{"id": <user id>, "exp": <unix seconds>}`. The expiry is kept
/// at whole-second resolution so a decoded claim equals the issued one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identifier of the authenticated user.
    #[serde(rename = "id")]
    pub user_id: UserId,

    /// Absolute expiration instant.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Claims expiring `validity` after `issued_at`.
    ///
    /// `None` when the expiry falls outside the representable time range.
    pub fn new(user_id: UserId, issued_at: DateTime<Utc>, validity: Duration) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(validity)?.trunc_subsecs(0);
        Some(Self { user_id, expires_at })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,
}

/// Deterministically validate session claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token::TokenCodec`] before this is reached.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= now {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_issue_time_plus_validity() {
        let issued_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = SessionClaims::new(UserId::new(1), issued_at, Duration::minutes(30)).unwrap();
        assert_eq!(claims.expires_at.timestamp(), 1_700_000_000 + 30 * 60);
        assert!(validate_claims(&claims, issued_at).is_ok());
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let issued_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = SessionClaims::new(UserId::new(1), issued_at, Duration::seconds(10)).unwrap();
        assert_eq!(
            validate_claims(&claims, claims.expires_at),
            Err(TokenValidationError::Expired)
        );
        assert!(validate_claims(&claims, claims.expires_at - Duration::seconds(1)).is_ok());
    }

    #[test]
    fn unrepresentable_expiry_is_none() {
        let issued_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let huge = Duration::try_minutes(200_000_000_000).unwrap();
        assert!(SessionClaims::new(UserId::new(1), issued_at, huge).is_none());
        assert!(SessionClaims::new(UserId::new(1), issued_at, -huge).is_none());
    }

    #[test]
    fn serializes_with_compact_field_names() {
        let issued_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = SessionClaims::new(UserId::new(9), issued_at, Duration::seconds(60)).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 9, "exp": 1_700_000_060 }));
    }
}
