//! Transactions API endpoints - JSON API
//!
//! Endpoints:
//! - list_transactions: all records, ascending creation order
//! - create_transaction: store a new record (201)
//! - update_transaction: replace the supplied fields of one record
//! - delete_transaction: remove one record
//! - delete_all_transactions: clear the collection

use crate::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use saldo_core::{NewTransaction, Transaction, TransactionPatch};
use serde::{Deserialize, Serialize};

/// Confirmation body for deletes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
}

/// Get all transactions (JSON API)
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state.store.list().await?;
    log::debug!("listing {} transactions", transactions.len());
    Ok(Json(transactions))
}

/// Create a transaction (JSON API)
pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let Json(new) = payload?;
    let created = state.store.create(new).await?;
    log::info!("created {} {} ({})", created.kind, created.id, created.amount);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update the supplied fields of a transaction (JSON API)
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionPatch>, JsonRejection>,
) -> Result<Json<Transaction>, ApiError> {
    let Json(patch) = payload?;
    let updated = state.store.update(&id, patch).await?;
    log::info!("updated transaction {}", updated.id);
    Ok(Json(updated))
}

/// Delete one transaction (JSON API)
///
/// An unknown id still answers 200.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.store.delete(&id).await? {
        log::info!("deleted transaction {}", id);
    } else {
        log::debug!("delete of unknown transaction {} ignored", id);
    }
    Ok(Json(MessageResponse {
        message: "Transaction deleted".to_string(),
        deleted: None,
    }))
}

/// Delete every transaction (JSON API)
pub async fn delete_all_transactions(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.store.delete_all().await?;
    log::info!("cleared {} transactions", removed);
    Ok(Json(MessageResponse {
        message: "All transactions deleted".to_string(),
        deleted: Some(removed),
    }))
}
