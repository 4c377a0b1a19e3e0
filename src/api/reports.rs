//! Read-only product reports.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::warn;

use crate::database::product_repository::TOP_PRODUCTS;
use crate::models::{Product, ProductReportFilter};

use super::AppState;

/// `GET /api/products/reports`
///
/// With at least one of `name`, `manufacturer`, `sku` set, runs the
/// filtered search; with none, falls back to the top-ten-by-quantity
/// report.
pub async fn product_report(
    State(state): State<AppState>,
    Query(filter): Query<ProductReportFilter>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    let result = if filter.is_unconstrained() {
        state.repository.top_n(TOP_PRODUCTS).await
    } else {
        state.repository.search(&filter).await
    };

    match result {
        Ok(products) => Ok(Json(products)),
        Err(err) => {
            warn!("failed to build product report: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
