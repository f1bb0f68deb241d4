// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitness API client.
//!
//! Every request carries the session's bearer token and user id, read from
//! the session store right before sending. Requests are never blocked for a
//! missing token, never retried, and a 401 is returned to the caller as is.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityListResponse, NewActivity, Recommendation};
use crate::services::SessionManager;

/// Header carrying the user id alongside the bearer token.
pub const USER_ID_HEADER: &str = "X-USER-ID";

/// Authenticated client for the fitness REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://host:8080/api`).
    pub fn new(base_url: &Url, timeout: Duration, session: Arc<SessionManager>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    /// List the user's activities (`GET /activities`).
    ///
    /// Both a plain array and a `{ "content": [...] }` page are accepted.
    pub async fn list_activities(&self) -> Result<Vec<Activity>> {
        let url = format!("{}/activities", self.base_url);
        let response: ActivityListResponse = self.send_json(self.http.get(&url), "GET", &url).await?;
        Ok(response.into_activities())
    }

    /// Log a new activity (`POST /activities`).
    pub async fn create_activity(&self, activity: &NewActivity) -> Result<Activity> {
        let url = format!("{}/activities", self.base_url);
        self.send_json(self.http.post(&url).json(activity), "POST", &url)
            .await
    }

    /// Recommendation for an activity (`GET /recommendations/activity/{id}`).
    pub async fn get_recommendation(&self, activity_id: &str) -> Result<Recommendation> {
        let url = format!(
            "{}/recommendations/activity/{}",
            self.base_url,
            urlencoding::encode(activity_id)
        );
        self.send_json(self.http.get(&url), "GET", &url).await
    }

    /// Attach the session credentials that are currently present.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(user_id) = self.session.user_id() {
            request = request.header(USER_ID_HEADER, user_id);
        }
        request
    }

    /// Send with credentials, check the status and parse the JSON body.
    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &str,
    ) -> Result<T> {
        let response = self.authorize(request).send().await.map_err(|e| {
            let reason = if e.is_timeout() { "timed out" } else { "request failed" };
            tracing::error!(method, url, error = %e, "API {}", reason);
            AppError::Api {
                status: None,
                message: format!("{}: {}", reason, e),
            }
        })?;

        let response = check_response(response, method, url).await?;

        response.json().await.map_err(|e| {
            tracing::error!(method, url, error = %e, "Unparseable API response");
            AppError::Api {
                status: None,
                message: format!("JSON parse error: {}", e),
            }
        })
    }
}

/// Turn a non-success status into an error, logging status and body.
async fn check_response(
    response: reqwest::Response,
    method: &str,
    url: &str,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 401 {
        tracing::warn!(method, url, "API rejected credentials (401)");
    } else {
        tracing::error!(method, url, status = %status, body = %body, "API request failed");
    }

    Err(AppError::Api {
        status: Some(status.as_u16()),
        message: format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ),
    })
}
