// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers for the loopback listener.

pub mod callback;

use crate::AppState;
use axum::{body::Body, http::Request, middleware, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the router that receives the OAuth redirect.
pub fn create_router(state: Arc<AppState>) -> Router {
    let path = state.config.oauth.redirect_uri.path().to_string();

    Router::new()
        .merge(callback::routes(&path))
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                // Path only: the query holds the authorization code
                .make_span_with(|req: &Request<Body>| {
                    tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
