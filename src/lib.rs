pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod server;
pub mod validation;

use std::sync::Arc;

use auth::provider::{AuthClient, AuthProvider};
use auth::session::SessionCache;
use config::AppConfig;
use db::DbPool;
use error::AppError;

/// Shared application state accessible from all request handlers.
pub struct AppState {
    pub db: DbPool,
    /// Auth provider client (trait object so tests can substitute a mock).
    pub auth: Arc<dyn AuthProvider>,
    /// Process-wide cached session with an expiry-based staleness policy.
    pub session: tokio::sync::Mutex<SessionCache>,
}

/// Start the server: config, logging, database, then serve until shutdown.
pub async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    // The data dir hosts the log directory, so it must exist before tracing
    // initializes its file appender.
    std::fs::create_dir_all(&config.data_dir)?;
    let _log_guard = logging::init(&config.data_dir);

    tracing::info!("Starting NAY'S CAKE server v{}", env!("CARGO_PKG_VERSION"));

    let pool = db::init_db(&config.data_dir)?;
    tracing::info!("Database pool ready (max_size=8)");

    let auth_client = AuthClient::new(
        config.auth_base_url.clone(),
        config.auth_service_key.clone(),
    )?;

    let state = Arc::new(AppState {
        db: pool,
        auth: Arc::new(auth_client),
        session: tokio::sync::Mutex::new(SessionCache::default()),
    });

    server::serve(config.bind_addr, state).await
}
