//! Product catalog and stock endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::db::models::{CreateProductInput, Product, UpdateProductInput};
use crate::db::repos::products;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}

/// GET /api/products
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(products::get_all(&state.db)?))
}

/// GET /api/products/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(products::get_by_id(&state.db, &id)?))
}

/// POST /api/products
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateProductInput>,
) -> Result<Json<Product>, AppError> {
    let product = products::create(&state.db, input)?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(products::update(&state.db, &id, input)?))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !products::delete(&state.db, &id)? {
        return Err(AppError::NotFound(format!("Product {id}")));
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /api/products/{id}/stock -- adjust stock by a signed delta
/// (restock positive, correction/spoilage negative).
pub async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<StockAdjustment>,
) -> Result<Json<Product>, AppError> {
    let product = products::adjust_stock(&state.db, &id, input.delta)?;
    tracing::info!(product_id = %id, delta = input.delta, stock = product.stock, "Stock adjusted");
    Ok(Json(product))
}
