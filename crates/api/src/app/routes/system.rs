use axum::{Json, http::StatusCode};

use crate::app::dto::MessageResponse;

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the Stockroom API"))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
