//! Product repository - data access for the `products` table.
//!
//! Every operation opens its own bounded-lifetime database call: the
//! statement future is raced against a per-call deadline, and exceeding
//! the deadline fails the call rather than blocking the request task.
//! Absence of a row is an error only where the contract says so
//! (`get_by_id` returns `Ok(None)`); list-shaped reads surface absence as
//! an empty vector.

use std::future::Future;
use std::time::Duration;

use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::time::timeout;
use tracing::{error, info};

use crate::error::ProductDataError;
use crate::models::{Product, ProductReportFilter};

/// Deadline for ordinary read and write statements.
const READ_WRITE_DEADLINE: Duration = Duration::from_secs(3);

/// Longer deadline for single-row lookups expected to tolerate contention.
const LOOKUP_DEADLINE: Duration = Duration::from_secs(15);

/// How many rows the top-sellers report returns.
pub const TOP_PRODUCTS: i64 = 10;

#[derive(Clone, Debug)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Single-row lookup by primary key. A missing row is `Ok(None)`,
    /// distinct from a query or connectivity failure.
    pub async fn get_by_id(&self, product_id: i32) -> Result<Option<Product>, ProductDataError> {
        let query = sqlx::query_as::<_, Product>(
            r#"SELECT
                   productId AS product_id,
                   manufacturer,
                   sku,
                   upc,
                   pricePerUnit AS price_per_unit,
                   quantityOnHand AS quantity_on_hand,
                   productName AS product_name
               FROM products
               WHERE productId = $1"#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool);

        bounded("fetch product by id", LOOKUP_DEADLINE, query).await
    }

    /// All products ordered by ID ascending; empty when the table is.
    pub async fn list(&self) -> Result<Vec<Product>, ProductDataError> {
        let query = sqlx::query_as::<_, Product>(
            r#"SELECT
                   productId AS product_id,
                   manufacturer,
                   sku,
                   upc,
                   pricePerUnit AS price_per_unit,
                   quantityOnHand AS quantity_on_hand,
                   productName AS product_name
               FROM products
               ORDER BY productId"#,
        )
        .fetch_all(&self.pool);

        bounded("list products", READ_WRITE_DEADLINE, query).await
    }

    /// The `n` products with the largest quantity on hand, descending.
    /// Ties fall back to storage order.
    pub async fn top_n(&self, n: i64) -> Result<Vec<Product>, ProductDataError> {
        let query = sqlx::query_as::<_, Product>(
            r#"SELECT
                   productId AS product_id,
                   manufacturer,
                   sku,
                   upc,
                   pricePerUnit AS price_per_unit,
                   quantityOnHand AS quantity_on_hand,
                   productName AS product_name
               FROM products
               ORDER BY quantityOnHand DESC
               LIMIT $1"#,
        )
        .bind(n)
        .fetch_all(&self.pool);

        bounded("fetch top products", READ_WRITE_DEADLINE, query).await
    }

    /// Insert all columns except the ID and return the store-assigned ID.
    /// An insert that yields no returned ID is a distinct error, never a
    /// silent zero.
    pub async fn insert(&self, product: &Product) -> Result<i32, ProductDataError> {
        let query = sqlx::query_scalar::<_, i32>(
            r#"INSERT INTO products
                   (manufacturer, sku, upc, pricePerUnit, quantityOnHand, productName)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING productId"#,
        )
        .bind(&product.manufacturer)
        .bind(&product.sku)
        .bind(&product.upc)
        .bind(product.price_per_unit)
        .bind(product.quantity_on_hand)
        .bind(&product.product_name)
        .fetch_optional(&self.pool);

        match bounded("insert product", READ_WRITE_DEADLINE, query).await? {
            Some(product_id) => {
                info!("inserted product {product_id}");
                Ok(product_id)
            }
            None => {
                error!("insert completed without a generated product ID");
                Err(ProductDataError::MissingInsertId)
            }
        }
    }

    /// Full-column update keyed by the product's assigned ID. An unset ID
    /// is rejected before any store call is made.
    pub async fn update(&self, product: &Product) -> Result<(), ProductDataError> {
        if product.product_id == 0 {
            return Err(ProductDataError::InvalidProductId);
        }

        let query = sqlx::query(
            r#"UPDATE products SET
                   manufacturer = $1,
                   sku = $2,
                   upc = $3,
                   pricePerUnit = CAST($4 AS NUMERIC(13, 2)),
                   quantityOnHand = $5,
                   productName = $6
               WHERE productId = $7"#,
        )
        .bind(&product.manufacturer)
        .bind(&product.sku)
        .bind(&product.upc)
        .bind(product.price_per_unit)
        .bind(product.quantity_on_hand)
        .bind(&product.product_name)
        .bind(product.product_id)
        .execute(&self.pool);

        bounded("update product", READ_WRITE_DEADLINE, query).await?;
        info!("updated product {}", product.product_id);
        Ok(())
    }

    /// Unconditional delete by ID. Deleting a nonexistent ID affects zero
    /// rows and is not an error.
    pub async fn delete(&self, product_id: i32) -> Result<(), ProductDataError> {
        let query = sqlx::query("DELETE FROM products WHERE productId = $1")
            .bind(product_id)
            .execute(&self.pool);

        bounded("delete product", READ_WRITE_DEADLINE, query).await?;
        info!("deleted product {product_id}");
        Ok(())
    }

    /// Case-insensitive substring search over name, manufacturer, and SKU.
    /// Returned rows carry manufacturer, SKU, and product name lower-cased
    /// by the store; stored rows are untouched.
    pub async fn search(
        &self,
        filter: &ProductReportFilter,
    ) -> Result<Vec<Product>, ProductDataError> {
        let mut builder = build_search_query(filter);
        let query = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool);

        bounded("search products", READ_WRITE_DEADLINE, query).await
    }
}

/// Fold the filter's optional (column, pattern) pairs onto an
/// unconditional base predicate, in the fixed contribution order
/// name -> manufacturer -> SKU. Parameter numbering is handled by the
/// builder, so any subset of filters (including none) is well-formed.
fn build_search_query(filter: &ProductReportFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT productId AS product_id, \
                LOWER(manufacturer) AS manufacturer, \
                LOWER(sku) AS sku, \
                upc, \
                pricePerUnit AS price_per_unit, \
                quantityOnHand AS quantity_on_hand, \
                LOWER(productName) AS product_name \
         FROM products WHERE 1=1",
    );

    if !filter.name_filter.is_empty() {
        builder.push(" AND productName ILIKE ");
        builder.push_bind(format!("%{}%", filter.name_filter.to_lowercase()));
    }
    if !filter.manufacturer_filter.is_empty() {
        builder.push(" AND manufacturer ILIKE ");
        builder.push_bind(format!("%{}%", filter.manufacturer_filter.to_lowercase()));
    }
    if !filter.sku_filter.is_empty() {
        builder.push(" AND sku ILIKE ");
        builder.push_bind(format!("%{}%", filter.sku_filter.to_lowercase()));
    }

    builder
}

/// Race a statement future against its deadline, mapping both failure
/// modes into the repository error taxonomy. Failures are logged here
/// with full detail; callers surface them opaquely.
async fn bounded<T, F>(
    what: &str,
    deadline: Duration,
    statement: F,
) -> Result<T, ProductDataError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(deadline, statement).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            error!("{what} failed: {err}");
            Err(ProductDataError::Database(err))
        }
        Err(_) => {
            error!("{what} exceeded its {}s deadline", deadline.as_secs());
            Err(ProductDataError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        // Never connects; suitable for paths that must not reach the store.
        PgPoolOptions::new()
            .connect_lazy("postgresql://localhost:5432/unreachable")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn update_with_unassigned_id_is_rejected_before_any_store_call() {
        let repository = ProductRepository::new(lazy_pool());
        let err = repository.update(&Product::default()).await.unwrap_err();
        assert!(matches!(err, ProductDataError::InvalidProductId));
    }

    #[test]
    fn search_query_folds_filters_in_contribution_order() {
        let filter = ProductReportFilter {
            name_filter: "widget".to_string(),
            manufacturer_filter: "ooma".to_string(),
            sku_filter: String::new(),
        };

        let sql = build_search_query(&filter).into_sql();
        let name_at = sql.find("productName ILIKE $1").expect("name clause");
        let manufacturer_at = sql.find("manufacturer ILIKE $2").expect("manufacturer clause");
        assert!(name_at < manufacturer_at);
        assert!(!sql.contains("sku ILIKE"));
    }

    #[test]
    fn search_query_numbers_a_lone_trailing_filter_from_one() {
        let filter = ProductReportFilter {
            sku_filter: "ooma1234".to_string(),
            ..Default::default()
        };

        let sql = build_search_query(&filter).into_sql();
        assert!(sql.contains("sku ILIKE $1"));
        assert!(!sql.contains("$2"));
    }

    #[test]
    fn unconstrained_search_query_is_well_formed() {
        let sql = build_search_query(&ProductReportFilter::default()).into_sql();
        assert!(sql.ends_with("WHERE 1=1"));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn search_projection_lowercases_display_columns_only() {
        let sql = build_search_query(&ProductReportFilter::default()).into_sql();
        assert!(sql.contains("LOWER(manufacturer)"));
        assert!(sql.contains("LOWER(sku)"));
        assert!(sql.contains("LOWER(productName)"));
        assert!(!sql.contains("LOWER(upc)"));
    }
}
