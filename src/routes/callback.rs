// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth redirect handling on the loopback listener.

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::Result;
use crate::views::auth::{complete_login, is_callback, render_status};
use crate::AppState;

/// Serve the redirect URI's path.
pub fn routes(path: &str) -> Router<Arc<AppState>> {
    Router::new().route(path, get(callback))
}

/// Provider redirect: finish the login and redirect to the clean URL.
///
/// Any other visit gets a short status page. Completion is signalled once the
/// browser has been served a page without the code: the status page after a
/// successful redirect, or the error response of a failed attempt.
async fn callback(State(state): State<Arc<AppState>>, uri: Uri) -> Result<Response> {
    let mut current = state.config.oauth.redirect_uri.clone();
    current.set_query(uri.query());

    if !is_callback(&current) {
        let page = render_status(&state.auth_view.credentials());
        if state.redirect_pending.swap(false, Ordering::SeqCst) {
            tracing::debug!("Browser reached the clean URL");
            state.login_complete.notify_one();
        }
        return Ok(page.into_response());
    }

    let authorized = match complete_login(&state, &current).await {
        Ok(authorized) => authorized,
        Err(e) => {
            // Nothing follows a failed attempt; the nonce is already consumed.
            state.login_complete.notify_one();
            return Err(e);
        }
    };
    tracing::info!(user_id = ?authorized.user_id, "Login completed, redirecting to clean URL");

    state.redirect_pending.store(true, Ordering::SeqCst);
    Ok(Redirect::to(authorized.clean_url.as_str()).into_response())
}
