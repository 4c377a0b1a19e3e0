//! Inventory management backend: product records over HTTP (REST) and a
//! websocket push channel, backed by PostgreSQL.
//!
//! Layering, leaf to root: [`database`] owns the pooled store gateway and
//! the product repository, [`api`] exposes the resource and report
//! handlers, and [`realtime`] fans mutation events out to websocket
//! subscribers.

pub mod api;
pub mod database;
pub mod error;
pub mod models;
pub mod realtime;

pub use database::{DatabaseConfig, DatabaseManager, ProductRepository};
pub use error::ProductDataError;
pub use models::{Product, ProductReportFilter};
