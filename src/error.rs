//! Error types for the product data layer.
//!
//! Handlers translate these into HTTP status codes; the repository never
//! panics or terminates the process on a per-request failure.

use thiserror::Error;

/// Failures surfaced by the product repository.
#[derive(Debug, Error)]
pub enum ProductDataError {
    /// Update called on a product whose ID was never assigned.
    #[error("product has invalid ID")]
    InvalidProductId,

    /// The insert completed but the store returned no generated ID.
    #[error("insert returned no product ID")]
    MissingInsertId,

    /// A per-call deadline expired before the statement completed.
    #[error("database call exceeded its deadline")]
    Timeout,

    /// Connectivity or statement failure from the store. Logged in full
    /// server-side, opaque to clients.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
