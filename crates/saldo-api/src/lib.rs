//! HTTP store service for transaction records
//!
//! Routes are organized into modules:
//! - routes::transactions: CRUD over the collection
//!
//! The transaction routes are mounted twice, at `/transactions` and under
//! `/api`, so both path styles reach the same handlers.

pub mod error;
pub mod routes;

use axum::{
    routing::{get, put},
    Router,
};
use saldo_config::Config;
use saldo_store::StoreRef;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: StoreRef,
}

fn transaction_routes() -> Router<AppState> {
    use routes::transactions::{
        create_transaction, delete_all_transactions, delete_transaction, list_transactions,
        update_transaction,
    };

    Router::new()
        .route(
            "/transactions",
            get(list_transactions)
                .post(create_transaction)
                .delete(delete_all_transactions),
        )
        .route(
            "/transactions/:id",
            put(update_transaction).delete(delete_transaction),
        )
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(transaction_routes())
        .nest("/api", transaction_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(config: Config, store: StoreRef) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    log::info!("using store {}", store.describe());

    let state = AppState { store };
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting saldo store service on http://{}", addr);
    log::info!("  - /transactions, /api/transactions (CRUD)");
    log::info!("  - /api/health");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================
