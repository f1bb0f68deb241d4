//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for ordinary API calls. The token exchange has none.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// OAuth2 identity provider settings (authorization-code flow, public client).
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Public client ID registered with the identity provider
    pub client_id: String,
    /// Authorization endpoint the user is sent to
    pub authorization_endpoint: Url,
    /// Token endpoint the authorization code is exchanged at
    pub token_endpoint: Url,
    /// Redirect URI registered for this client; the loopback listener serves it
    pub redirect_uri: Url,
    /// Space-separated scopes
    pub scope: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub oauth: OAuthConfig,
    /// Base URL of the fitness REST API (including the `/api` prefix)
    pub api_base_url: Url,
    /// Connect/response timeout for API calls
    pub api_timeout: Duration,
    /// Durable session file (the client's `localStorage`)
    pub session_file: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            oauth: OAuthConfig {
                client_id: "fitness-tracker-frontend".to_string(),
                authorization_endpoint: static_url(
                    "http://localhost:8181/realms/fitness-tracker/protocol/openid-connect/auth",
                ),
                token_endpoint: static_url(
                    "http://localhost:8181/realms/fitness-tracker/protocol/openid-connect/token",
                ),
                redirect_uri: static_url("http://localhost:5173/"),
                scope: "openid profile email".to_string(),
            },
            api_base_url: static_url("http://localhost:8080/api"),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            session_file: PathBuf::from(".fitness-session.json"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_timeout_secs = match env::var("API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "API_TIMEOUT_SECS",
                reason: format!("not a number of seconds: {raw}"),
            })?,
            Err(_) => DEFAULT_API_TIMEOUT_SECS,
        };

        Ok(Self {
            oauth: OAuthConfig {
                client_id: env::var("OAUTH_CLIENT_ID")
                    .map(|v| v.trim().to_string())
                    .unwrap_or_else(|_| "fitness-tracker-frontend".to_string()),
                authorization_endpoint: required_url("OAUTH_AUTHORIZATION_ENDPOINT")?,
                token_endpoint: required_url("OAUTH_TOKEN_ENDPOINT")?,
                redirect_uri: optional_url("OAUTH_REDIRECT_URI", "http://localhost:5173/")?,
                scope: env::var("OAUTH_SCOPE")
                    .unwrap_or_else(|_| "openid profile email".to_string()),
            },
            api_base_url: optional_url("API_BASE_URL", "http://localhost:8080/api")?,
            api_timeout: Duration::from_secs(api_timeout_secs),
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".fitness-session.json")),
        })
    }
}

fn required_url(name: &'static str) -> Result<Url, ConfigError> {
    let raw = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    parse_url(name, &raw)
}

fn optional_url(name: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    parse_url(name, &raw)
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{e}: {raw}"),
    })
}

// Only called with literals above.
fn static_url(raw: &str) -> Url {
    Url::parse(raw).unwrap_or_else(|e| panic!("invalid built-in URL {raw}: {e}"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
