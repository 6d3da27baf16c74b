use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
};

use stockroom_auth::{AuthError, IdentityStore};
use stockroom_core::UserId;

use crate::app::dto::UserResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.resolver.store().list().await {
        Ok(identities) => {
            let users: Vec<UserResponse> = identities.into_iter().map(UserResponse::from).collect();
            Json(users).into_response()
        }
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("user"),
    };

    match services.resolver.store().find_by_id(user_id).await {
        Ok(Some(identity)) => Json(UserResponse::from(identity)).into_response(),
        Ok(None) => errors::auth_error_to_response(AuthError::NotFound),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}
