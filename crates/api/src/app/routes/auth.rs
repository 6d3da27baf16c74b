use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::dto::{CredentialsRequest, MessageResponse};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/login-oauth2", post(login_oauth2))
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CredentialsRequest>,
) -> axum::response::Response {
    match services.resolver.register(&body.username, &body.password).await {
        Ok(identity) => (
            StatusCode::CREATED,
            Json(MessageResponse::new(format!(
                "User created successfully with username: {}",
                identity.handle
            ))),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CredentialsRequest>,
) -> axum::response::Response {
    issue_token(&services, body).await
}

/// OAuth2 password-flow variant of [`login`] (form-encoded body).
pub async fn login_oauth2(
    Extension(services): Extension<Arc<AppServices>>,
    Form(body): Form<CredentialsRequest>,
) -> axum::response::Response {
    issue_token(&services, body).await
}

async fn issue_token(services: &AppServices, body: CredentialsRequest) -> axum::response::Response {
    match services.resolver.login(&body.username, &body.password).await {
        Ok(token) => Json(token).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
