use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Runtime configuration, resolved once at startup from the environment.
///
/// A missing auth provider setting is a configuration error, not a business
/// failure: the process refuses to start rather than failing requests later.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite file and rolling logs.
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Auth provider base URL, e.g. `https://xyz.supabase.co`.
    pub auth_base_url: String,
    /// Auth provider service key (admin scope; server-side only).
    pub auth_service_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let data_dir = std::env::var("NAYSCAKE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let bind_addr = parse_bind_addr(
            std::env::var("NAYSCAKE_BIND_ADDR")
                .as_deref()
                .unwrap_or("127.0.0.1:8080"),
        )?;

        let auth_base_url = require_env("AUTH_BASE_URL")?;
        let auth_service_key = require_env("AUTH_SERVICE_KEY")?;

        Ok(Self {
            data_dir,
            bind_addr,
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            auth_service_key,
        })
    }
}

fn require_env(name: &str) -> Result<String, AppError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Config(format!(
            "{name} not configured. Set it as an environment variable or in .env."
        ))),
    }
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, AppError> {
    raw.parse()
        .map_err(|_| AppError::Config(format!("invalid bind address: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_addr() {
        assert_eq!(
            parse_bind_addr("127.0.0.1:8080").unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_bind_addr("not-an-address").is_err());
        assert!(parse_bind_addr("127.0.0.1").is_err());
    }

    #[test]
    fn test_missing_env_is_config_error() {
        let err = require_env("NAYSCAKE_TEST_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
