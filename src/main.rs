use std::sync::Arc;

use tracing::info;

use inventory_service::api::{create_router, AppState};
use inventory_service::database::{DatabaseConfig, DatabaseManager};
use inventory_service::realtime::ProductEvents;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "inventory_service=info,tower_http=info".to_string()),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Database connection
    let manager = DatabaseManager::new(DatabaseConfig::default()).await?;
    manager.test_connection().await?;
    manager.verify_schema().await?;
    info!("{}", manager.connection_stats());

    // Create application state
    let state = AppState {
        repository: Arc::new(manager.product_repository()),
        events: ProductEvents::new(),
    };

    // Build our application with routes
    let app = create_router(state);

    // Determine port
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse::<u16>()
        .unwrap_or(5000);

    let addr = format!("0.0.0.0:{port}");
    info!("Starting inventory service on {addr}");

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
