//! Auth endpoints: legacy migration, login, logout, session state.
//!
//! The migrate endpoint must never be the reason a login fails: every error
//! is caught, logged, and converted into a structured response, and the
//! login handler ignores the migration result entirely.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::migration::{self, MigrationOutcome};
use crate::auth::session::{CachedSession, SessionState};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MigrateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pull out non-empty credentials, or the 400 response naming the missing
/// field. Runs before any store is contacted.
fn required_credentials(
    req: &CredentialsRequest,
) -> Result<(String, String), (StatusCode, Json<MigrateResponse>)> {
    let field_missing = |field: &str| {
        (
            StatusCode::BAD_REQUEST,
            Json(MigrateResponse {
                success: false,
                migrated: None,
                message: Some(format!("{field} is required")),
            }),
        )
    };

    let username = match req.username.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => return Err(field_missing("username")),
    };
    let password = match req.password.as_deref() {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(field_missing("password")),
    };
    Ok((username, password))
}

/// POST /api/auth/migrate -- migrate a legacy user if these credentials
/// belong to one. "Nothing to do" is a success.
pub async fn migrate_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let (username, password) = match required_credentials(&req) {
        Ok(creds) => creds,
        Err(resp) => return resp,
    };

    match migration::migrate_legacy_user(&state.db, state.auth.as_ref(), &username, &password).await
    {
        Ok(MigrationOutcome::Migrated { .. }) => (
            StatusCode::OK,
            Json(MigrateResponse {
                success: true,
                migrated: Some(true),
                message: None,
            }),
        ),
        Ok(MigrationOutcome::NotApplicable) => (
            StatusCode::OK,
            Json(MigrateResponse {
                success: true,
                migrated: Some(false),
                message: None,
            }),
        ),
        Err(e) => {
            // Logged here, swallowed for the caller: the login flow proceeds
            // to sign-in regardless.
            tracing::error!(username = %username, "Legacy migration failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MigrateResponse {
                    success: false,
                    migrated: None,
                    message: Some("migration failed".into()),
                }),
            )
        }
    }
}

/// POST /api/auth/login -- fire-and-forget migration, then provider sign-in.
/// Any sign-in failure collapses to one generic message so callers can't
/// tell which side failed.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let (username, password) = match required_credentials(&req) {
        Ok(creds) => creds,
        Err((status, Json(resp))) => {
            return (
                status,
                Json(LoginResponse {
                    success: false,
                    session: None,
                    message: resp.message,
                }),
            )
        }
    };

    // Fire-and-forget: the result is irrelevant to sign-in, only logged.
    match migration::migrate_legacy_user(&state.db, state.auth.as_ref(), &username, &password).await
    {
        Ok(outcome) => tracing::debug!(username = %username, ?outcome, "Pre-login migration ran"),
        Err(e) => {
            tracing::warn!(username = %username, "Pre-login migration failed, proceeding to sign-in: {}", e)
        }
    }

    match state.auth.sign_in(&username, &password).await {
        Ok(provider_session) => {
            let cached = CachedSession::new(
                provider_session.user.id,
                username.clone(),
                provider_session.access_token,
                provider_session.expires_in,
            );
            let session_state = {
                let mut cache = state.session.lock().await;
                cache.store(cached);
                cache.state()
            };
            tracing::info!(username = %username, "User signed in");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    session: Some(session_state),
                    message: None,
                }),
            )
        }
        Err(e) => {
            tracing::debug!(username = %username, "Sign-in failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse {
                    success: false,
                    session: None,
                    message: Some("invalid username or password".into()),
                }),
            )
        }
    }
}

/// POST /api/auth/logout -- clear the cached session.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.lock().await.clear();
    tracing::info!("Session cleared");
    Json(serde_json::json!({ "success": true }))
}

/// GET /api/auth/session -- current session state, staleness applied.
pub async fn session_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.lock().await.state())
}
