//! Sales reporting endpoints. JSON aggregates only; presentation (charts,
//! CSV) lives client-side.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::models::SalesBucket;
use crate::db::repos::reports::{self, Period};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub period: Option<Period>,
}

/// GET /api/reports/sales?period=daily|weekly|monthly (default daily).
pub async fn sales(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<SalesBucket>>, AppError> {
    let period = params.period.unwrap_or(Period::Daily);
    Ok(Json(reports::sales_summary(&state.db, period)?))
}
