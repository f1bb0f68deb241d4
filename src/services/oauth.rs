// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 authorization-code flow against the identity provider.
//!
//! Handles:
//! - Anti-forgery nonce generation and the authorization redirect
//! - Callback validation and code exchange
//! - Extracting the user id from the access token
//! - Session persistence and logout

use base64::{
    alphabet,
    engine::{general_purpose::URL_SAFE_NO_PAD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use reqwest::Url;
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::{Map, Value};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::OAuthConfig;
use crate::error::{AppError, Result};
use crate::models::{TokenResponse, UserProfile};
use crate::services::SessionManager;

/// Random bytes per nonce (43 characters once encoded).
const NONCE_BYTES: usize = 32;

/// Claims tried in order for the user id; the first non-empty one wins.
const USER_ID_CLAIMS: [&str; 3] = ["sub", "user_id", "preferred_username"];

/// Query parameters the provider appends to the redirect URI.
const CALLBACK_PARAMS: [&str; 4] = ["code", "state", "session_state", "iss"];

/// JWT segments are base64url; some issuers keep the padding.
const JWT_SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Outcome of a successful callback.
#[derive(Debug, Clone)]
pub struct AuthorizedSession {
    /// Raw token endpoint response
    pub tokens: TokenResponse,
    /// User id taken from the access token, if it could be decoded
    pub user_id: Option<String>,
    /// The callback URL without the authorization response parameters
    pub clean_url: Url,
}

/// Drives login, callback handling and logout.
#[derive(Clone)]
pub struct AuthFlow {
    config: OAuthConfig,
    session: Arc<SessionManager>,
    http: reqwest::Client,
    rng: SystemRandom,
}

impl AuthFlow {
    /// Create the flow. The token exchange client has no timeout.
    pub fn new(config: OAuthConfig, session: Arc<SessionManager>) -> Self {
        Self {
            config,
            session,
            http: reqwest::Client::new(),
            rng: SystemRandom::new(),
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    // ─── Login ───────────────────────────────────────────────────────────────

    /// Start a login attempt.
    ///
    /// Stores a fresh nonce (replacing any earlier one) and returns the
    /// authorization URL the user must be sent to.
    pub fn initiate_login(&self) -> Result<Url> {
        let nonce = self.generate_nonce()?;
        self.session.save_nonce(&nonce)?;

        let url = self.authorization_url(&nonce)?;

        tracing::info!(
            client_id = %self.config.client_id,
            redirect_uri = %self.config.redirect_uri,
            "Starting OAuth flow, redirecting to identity provider"
        );

        Ok(url)
    }

    /// Unpredictable nonce from the system CSPRNG.
    fn generate_nonce(&self) -> Result<String> {
        let mut bytes = [0u8; NONCE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("system random source failed")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    fn authorization_url(&self, state: &str) -> Result<Url> {
        let endpoint = self.config.authorization_endpoint.as_str();
        let separator = if self.config.authorization_endpoint.query().is_some() {
            '&'
        } else {
            '?'
        };

        let url = format!(
            "{}{}\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             state={}",
            endpoint,
            separator,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(self.config.redirect_uri.as_str()),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(state),
        );

        Url::parse(&url)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("bad authorization URL: {e}")))
    }

    // ─── Callback ────────────────────────────────────────────────────────────

    /// Complete a login from the URL the provider redirected back to.
    ///
    /// The stored nonce is consumed before anything else, so it is gone
    /// whatever the outcome. Nothing is persisted unless the code exchange
    /// succeeds.
    pub async fn handle_callback(&self, current_url: &Url) -> Result<AuthorizedSession> {
        let expected_state = self.session.take_nonce()?;

        let code = query_param(current_url, "code").filter(|c| !c.is_empty());
        let state = query_param(current_url, "state");

        let Some(code) = code else {
            tracing::error!("Invalid OAuth callback: missing authorization code");
            return Err(AppError::InvalidCallback("missing code".to_string()));
        };

        if !state_matches(expected_state.as_deref(), state.as_deref()) {
            tracing::error!(
                nonce_present = expected_state.is_some(),
                state_present = state.is_some(),
                "Invalid OAuth callback: state mismatch"
            );
            return Err(AppError::InvalidCallback("state mismatch".to_string()));
        }

        tracing::info!("Exchanging authorization code for tokens");
        let tokens = self.exchange_code(&code).await?;

        let user_id = user_id_from_token(&tokens.access_token);
        if user_id.is_none() {
            tracing::warn!("No user id in access token, continuing without one");
        }

        self.session.store_tokens(&tokens, user_id.as_deref())?;

        tracing::info!(user_id = ?user_id, "User authenticated");

        Ok(AuthorizedSession {
            tokens,
            user_id,
            clean_url: strip_callback_params(current_url),
        })
    }

    /// Exchange the authorization code at the token endpoint.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(self.config.token_endpoint.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Token exchange request failed");
                AppError::TokenExchange(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Token exchange failed");
            return Err(AppError::TokenExchange(format!(
                "token endpoint answered {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Unparseable token response");
            AppError::TokenExchange(format!("failed to parse token response: {}", e))
        })
    }

    // ─── Session accessors ───────────────────────────────────────────────────

    pub fn get_access_token(&self) -> Option<String> {
        self.session.access_token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_access_token().is_some()
    }

    /// Forget the session and any login attempt in progress.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        tracing::info!("Logged out, session cleared");
        Ok(())
    }
}

/// Compare the returned state with the stored nonce in constant time.
fn state_matches(expected: Option<&str>, received: Option<&str>) -> bool {
    match (expected, received) {
        (Some(expected), Some(received)) => expected.as_bytes().ct_eq(received.as_bytes()).into(),
        _ => false,
    }
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// The URL without the authorization response parameters.
pub fn strip_callback_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !CALLBACK_PARAMS.iter().any(|p| k == p))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut clean = url.clone();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean
}

// ─── Token decoding ──────────────────────────────────────────────────────────

/// Decode a JWT's payload without verifying it.
///
/// Returns `None` for anything that is not `header.payload[.signature]` with a
/// base64url JSON object payload.
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;

    let bytes = match JWT_SEGMENT.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Token payload is not base64url");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Some(claims),
        Ok(_) => {
            tracing::warn!("Token payload is not a JSON object");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token payload is not JSON");
            None
        }
    }
}

/// User id from an access token: `sub`, else `user_id`, else
/// `preferred_username`.
pub fn user_id_from_token(token: &str) -> Option<String> {
    let claims = decode_claims(token)?;
    USER_ID_CLAIMS
        .iter()
        .find_map(|name| claim_as_string(claims.get(*name)?))
}

fn claim_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Profile from the ID token's claims; empty when there is none to decode.
pub fn profile_from_id_token(tokens: &TokenResponse) -> UserProfile {
    tokens
        .id_token
        .as_deref()
        .and_then(decode_claims)
        .and_then(|claims| serde_json::from_value(Value::Object(claims)).ok())
        .unwrap_or_default()
}
