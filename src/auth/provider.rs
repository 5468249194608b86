//! Auth provider client. The provider owns durable identities and sessions;
//! this module only talks to its HTTP API and never stores credentials.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Convert any displayable error into `AppError::Auth`.
fn auth_err(e: impl std::fmt::Display) -> AppError {
    AppError::Auth(e.to_string())
}

// ============================================================================
// Trait + types
// ============================================================================

/// Input for provisioning a user. The provider hashes the plaintext password;
/// it never touches the legacy hash.
#[derive(Debug, Clone)]
pub struct NewUserInput {
    pub username: String,
    pub display_username: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: ProviderUser,
}

/// The auth provider surface this app consumes. A trait so tests can swap in
/// a recording mock instead of the network.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create a user. Duplicate usernames/emails are rejected by the
    /// provider; that rejection surfaces as an error here.
    async fn create_user(&self, input: NewUserInput) -> Result<ProviderUser, AppError>;

    /// Verify credentials and open a session.
    async fn sign_in(&self, username: &str, password: &str) -> Result<ProviderSession, AppError>;
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Serialize)]
struct AdminCreateUserBody<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
    user_metadata: UserMetadata<'a>,
}

#[derive(Serialize)]
struct UserMetadata<'a> {
    username: &'a str,
    display_username: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct PasswordGrantBody<'a> {
    email: &'a str,
    password: &'a str,
}

// ============================================================================
// AuthClient
// ============================================================================

/// HTTP client for a GoTrue-style auth API, authenticated with the service
/// key. Server-side only; the service key must never reach a client.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl AuthClient {
    /// The underlying `reqwest::Client` is configured with a 30-second timeout.
    pub fn new(base_url: String, service_key: String) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            service_key,
        })
    }

    /// Build an authenticated request to the given endpoint path.
    fn authed(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Send a request, check the status code, and deserialize the JSON response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let resp = req.send().await.map_err(auth_err)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "auth provider returned {status}: {body}"
            )));
        }
        resp.json().await.map_err(auth_err)
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    /// `POST /auth/v1/admin/users` -- provision a user with a pre-verified
    /// email (ownership of the password was already proven upstream).
    async fn create_user(&self, input: NewUserInput) -> Result<ProviderUser, AppError> {
        let req = self
            .authed(reqwest::Method::POST, "/auth/v1/admin/users")
            .json(&AdminCreateUserBody {
                email: &input.email,
                password: &input.password,
                email_confirm: input.email_verified,
                user_metadata: UserMetadata {
                    username: &input.username,
                    display_username: &input.display_username,
                    name: &input.name,
                },
            });
        self.send_json(req).await
    }

    /// `POST /auth/v1/token?grant_type=password` -- password sign-in. The
    /// username is resolved to its placeholder email, mirroring how migrated
    /// users were provisioned.
    async fn sign_in(&self, username: &str, password: &str) -> Result<ProviderSession, AppError> {
        let email = super::migration::placeholder_email(username);
        let req = self
            .authed(reqwest::Method::POST, "/auth/v1/token?grant_type=password")
            .json(&PasswordGrantBody {
                email: &email,
                password,
            });
        self.send_json(req).await
    }
}
