use axum::{Router, routing::get};

pub mod auth;
pub mod products;
pub mod system;
pub mod users;

/// Router for endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
}

/// Router for all authenticated endpoints.
pub fn protected_router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/products", products::router())
}
