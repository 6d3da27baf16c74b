use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::{get, put},
};

use stockroom_auth::Identity;
use stockroom_core::ProductId;
use stockroom_products::{NewProduct, PageRequest};

use crate::app::dto::{MessageResponse, ProductCreatedResponse, UpdateQuantityRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).delete(delete_product))
        .route("/:id/quantity", put(update_quantity))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Identity>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    match services.catalog.create(actor.id, body).await {
        Ok(product) => Json(ProductCreatedResponse {
            status: "success",
            product_id: product.id,
            message: format!("Product '{}' created successfully", product.name),
        })
        .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Identity>,
    Query(page): Query<PageRequest>,
) -> axum::response::Response {
    match services.catalog.list(actor.id, page).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("product"),
    };

    match services.catalog.get(actor.id, product_id).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<UpdateQuantityRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("product"),
    };

    match services.catalog.update_quantity(actor.id, product_id, body.quantity).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("product"),
    };

    match services.catalog.delete(actor.id, product_id).await {
        Ok(()) => Json(MessageResponse::new("Product deleted successfully")).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
