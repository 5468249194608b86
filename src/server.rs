use std::net::SocketAddr;
use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::{api, AppState};

/// Assemble the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/api/auth/migrate", post(api::auth::migrate_user))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/session", get(api::auth::session_state))
        // Catalog & stock
        .route("/api/products", get(api::products::list).post(api::products::create))
        .route(
            "/api/products/{id}",
            get(api::products::get)
                .put(api::products::update)
                .delete(api::products::delete),
        )
        .route("/api/products/{id}/stock", post(api::products::adjust_stock))
        // Transactions
        .route(
            "/api/transactions",
            get(api::transactions::list).post(api::transactions::create),
        )
        .route("/api/transactions/{id}", get(api::transactions::get))
        .route("/api/transactions/{id}/complete", post(api::transactions::complete))
        .route("/api/transactions/{id}/cancel", post(api::transactions::cancel))
        // Reporting
        .route("/api/reports/sales", get(api::reports::sales))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<(), AppError> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("NAY'S CAKE server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "service": "nayscake-server" }))
}
