use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use stockroom_auth::AuthError;
use stockroom_products::CatalogError;

pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials => unauthorized("invalid_credentials", "Incorrect username or password"),
        AuthError::InvalidToken => unauthorized("invalid_token", "Could not validate credentials"),
        AuthError::IdentityNotFound => unauthorized("identity_not_found", "Could not validate credentials"),
        AuthError::Forbidden => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Not authorized to modify this resource",
        ),
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Resource not found"),
        AuthError::DuplicateHandle => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate_handle",
            "Username already taken",
        ),
        AuthError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::Storage(e) => {
            error!(error = %e, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "Internal server error")
        }
        AuthError::Internal(msg) => {
            error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error")
        }
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> Response {
    match err {
        CatalogError::Validation(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        CatalogError::Auth(e) => auth_error_to_response(e),
        CatalogError::Store(e) => auth_error_to_response(AuthError::Storage(e)),
    }
}

/// 401 with the `WWW-Authenticate: Bearer` challenge.
pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Response {
    let mut response = json_error(StatusCode::UNAUTHORIZED, code, message);
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

pub fn invalid_id(what: &str) -> Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use stockroom_core::{DomainError, StoreError};

    use super::*;

    #[test]
    fn auth_failures_map_to_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::IdentityNotFound, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::DuplicateHandle, StatusCode::BAD_REQUEST),
            (AuthError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::Storage(StoreError::backend("down")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(auth_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn unauthorized_carries_bearer_challenge() {
        let response = auth_error_to_response(AuthError::InvalidToken);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let response = auth_error_to_response(AuthError::Forbidden);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn catalog_validation_is_bad_request() {
        let response = catalog_error_to_response(CatalogError::Validation(DomainError::validation("price")));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
