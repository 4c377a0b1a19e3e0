//! HTTP surface: shared state and router assembly.

pub mod products;
pub mod reports;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::ProductRepository;
use crate::realtime::{websocket, ProductEvents};

/// State shared by every handler. Requests are otherwise stateless and
/// independently dispatched.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<ProductRepository>,
    pub events: ProductEvents,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/products",
            get(products::list_products)
                .post(products::create_product)
                .options(products::preflight),
        )
        // Static segment; takes priority over the item route below.
        .route("/api/products/reports", get(reports::product_report))
        .route(
            "/api/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product)
                .options(products::preflight),
        )
        .route("/websocket", get(websocket::product_socket))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": "OK",
        "error": null,
    }))
}
