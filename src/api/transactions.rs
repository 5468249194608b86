//! Order capture and completion endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::models::{CreateTransactionInput, Transaction, TransactionDetail};
use crate::db::repos::transactions;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub user_id: Option<String>,
}

/// GET /api/transactions
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(transactions::list(&state.db, params.user_id.as_deref())?))
}

/// GET /api/transactions/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDetail>, AppError> {
    Ok(Json(transactions::get_by_id(&state.db, &id)?))
}

/// POST /api/transactions -- capture a pending order with line items.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateTransactionInput>,
) -> Result<Json<TransactionDetail>, AppError> {
    let detail = transactions::create(&state.db, input)?;
    tracing::info!(
        transaction_id = %detail.transaction.id,
        user_id = %detail.transaction.user_id,
        items = detail.items.len(),
        "Transaction captured"
    );
    Ok(Json(detail))
}

/// POST /api/transactions/{id}/complete -- decrement stock and finalize the
/// total atomically.
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDetail>, AppError> {
    let detail = transactions::complete(&state.db, &id)?;
    tracing::info!(
        transaction_id = %id,
        total = detail.transaction.total,
        "Transaction completed"
    );
    Ok(Json(detail))
}

/// POST /api/transactions/{id}/cancel
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransactionDetail>, AppError> {
    let detail = transactions::cancel(&state.db, &id)?;
    tracing::info!(transaction_id = %id, "Transaction cancelled");
    Ok(Json(detail))
}
