//! Product entity and report filter.
//!
//! The repository owns translation between these types and the `products`
//! table; the HTTP handlers own translation to and from the wire. Neither
//! layer retains entities beyond the request lifetime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single inventory product.
///
/// `product_id` is assigned by the store; 0 means "not yet persisted".
/// Wire names are camelCase (`productId`, `pricePerUnit`, ...) for client
/// compatibility, and decoding tolerates absent fields by zero-filling
/// them, so a creation body may omit `productId` entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub product_id: i32,
    pub manufacturer: String,
    pub sku: String,
    pub upc: String,
    /// Fixed-point price, two fractional digits at the store boundary.
    /// Serialized as a JSON number, not a string.
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_unit: Decimal,
    pub quantity_on_hand: i32,
    pub product_name: String,
}

/// Optional substring filters for the product report, read straight from
/// the query string (`?name=&manufacturer=&sku=`). An empty string leaves
/// the corresponding column unconstrained. Constructed per request,
/// consumed once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductReportFilter {
    #[serde(rename = "name")]
    pub name_filter: String,
    #[serde(rename = "manufacturer")]
    pub manufacturer_filter: String,
    #[serde(rename = "sku")]
    pub sku_filter: String,
}

impl ProductReportFilter {
    /// True when no filter field is set.
    pub fn is_unconstrained(&self) -> bool {
        self.name_filter.is_empty()
            && self.manufacturer_filter.is_empty()
            && self.sku_filter.is_empty()
    }
}
