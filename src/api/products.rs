//! Product resource handlers.
//!
//! Bodies are decoded leniently (any parse failure is a 400, never a
//! deserializer-specific status), and encoding always degrades to a
//! response status - no request may take the process down. Mutations
//! publish a change event only after the store call succeeds.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::warn;

use crate::models::Product;
use crate::realtime::ProductEvent;

use super::AppState;

/// Body of a successful `POST /api/products`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    #[serde(rename = "productId")]
    pub product_id: i32,
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    match state.repository.list().await {
        Ok(products) => Ok(Json(products)),
        Err(err) => {
            warn!("failed to list products: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), StatusCode> {
    let product: Product = match serde_json::from_slice(&body) {
        Ok(product) => product,
        Err(err) => {
            warn!("rejecting malformed product body: {err}");
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.repository.insert(&product).await {
        Ok(product_id) => {
            state.events.publish(ProductEvent::created(Product {
                product_id,
                ..product
            }));
            Ok((StatusCode::CREATED, Json(CreatedResponse { product_id })))
        }
        Err(err) => {
            warn!("failed to insert product: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Product>, StatusCode> {
    match state.repository.get_by_id(product_id).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            warn!("failed to fetch product {product_id}: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `PUT /api/products/{id}`
///
/// The body's ID must equal the path ID; a mismatch is rejected before
/// the store is touched, preventing silent cross-resource writes. All
/// update failures (validation and data-access alike) surface as 400.
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    body: Bytes,
) -> StatusCode {
    let product: Product = match serde_json::from_slice(&body) {
        Ok(product) => product,
        Err(err) => {
            warn!("rejecting malformed product body: {err}");
            return StatusCode::BAD_REQUEST;
        }
    };

    if product.product_id != product_id {
        warn!(
            "product body ID {} does not match path ID {product_id}",
            product.product_id
        );
        return StatusCode::BAD_REQUEST;
    }

    match state.repository.update(&product).await {
        Ok(()) => {
            state.events.publish(ProductEvent::updated(&product));
            StatusCode::OK
        }
        Err(err) => {
            warn!("failed to update product {product_id}: {err}");
            StatusCode::BAD_REQUEST
        }
    }
}

/// `DELETE /api/products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> StatusCode {
    match state.repository.delete(product_id).await {
        Ok(()) => {
            state.events.publish(ProductEvent::deleted(product_id));
            StatusCode::OK
        }
        Err(err) => {
            warn!("failed to delete product {product_id}: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// CORS preflight passthrough for both resource shapes.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
