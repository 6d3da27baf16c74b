use serde::{Deserialize, Serialize};

use stockroom_auth::Identity;
use stockroom_core::{ProductId, UserId};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `/auth/signup`, `/auth/login` and the OAuth2 password form.
///
/// Extra form fields (`grant_type`, `scope`, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of an identity; the digest never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.handle,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductCreatedResponse {
    pub status: &'static str,
    pub product_id: ProductId,
    pub message: String,
}
