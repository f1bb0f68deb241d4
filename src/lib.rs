// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness Tracker: log workouts and read AI recommendations
//!
//! This crate provides the client for a fitness-tracking API: OAuth2 login
//! against the identity provider, a persisted session, an authenticated API
//! client and the terminal views built on top of them.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;
pub mod views;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Notify;

use config::Config;
use error::Result;
use services::{ApiClient, AuthFlow, RequestTracker, SessionManager, ViewKey};
use storage::{FileStore, KeyValueStore, MemoryStore};
use views::AuthView;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub auth: AuthFlow,
    pub api: ApiClient,
    /// View-side copy of the credentials, reconciled with the session
    pub auth_view: AuthView,
    /// In-flight view requests
    pub requests: RequestTracker<ViewKey>,
    /// Set after a successful callback until the browser lands on the clean URL
    pub redirect_pending: AtomicBool,
    /// Signalled once the login attempt is over and the browser has its page
    pub login_complete: Notify,
}

impl AppState {
    /// Build the state over explicit stores.
    pub fn new(
        config: Config,
        durable: Arc<dyn KeyValueStore>,
        scoped: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let session = Arc::new(SessionManager::new(durable, scoped));
        let auth = AuthFlow::new(config.oauth.clone(), session.clone());
        let api = ApiClient::new(&config.api_base_url, config.api_timeout, session.clone())?;
        let auth_view = AuthView::load(&session);

        Ok(Self {
            config,
            session,
            auth,
            api,
            auth_view,
            requests: RequestTracker::new(),
            redirect_pending: AtomicBool::new(false),
            login_complete: Notify::new(),
        })
    }

    /// Build the state with the durable session file from the config and a
    /// process-lifetime store for the login nonce.
    pub fn open(config: Config) -> Result<Self> {
        let durable = Arc::new(FileStore::open(config.session_file.clone()));
        tracing::debug!(path = %durable.path().display(), "Session file opened");
        Self::new(config, durable, Arc::new(MemoryStore::new()))
    }
}
