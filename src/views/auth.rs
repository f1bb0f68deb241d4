// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth view state and its reconciliation with the session store.

use reqwest::Url;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::models::UserProfile;
use crate::services::oauth::{profile_from_id_token, AuthorizedSession};
use crate::services::SessionManager;
use crate::AppState;

/// Which top-level screen to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LoggedOut,
    LoggedIn,
}

/// Credentials as the views see them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user: Option<UserProfile>,
}

/// View-side credential store. Navigation decisions read from here, so it
/// must be reconciled with the session after every login.
#[derive(Debug, Default)]
pub struct AuthView {
    credentials: RwLock<Credentials>,
}

impl AuthView {
    /// Initial view state from whatever the session already holds.
    pub fn load(session: &SessionManager) -> Self {
        Self {
            credentials: RwLock::new(Credentials {
                token: session.access_token(),
                user_id: session.user_id(),
                user: session.user(),
            }),
        }
    }

    pub fn credentials(&self) -> Credentials {
        self.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn screen(&self) -> Screen {
        if self.is_logged_in() {
            Screen::LoggedIn
        } else {
            Screen::LoggedOut
        }
    }

    /// Adopt new credentials and persist the parts the views own.
    ///
    /// The user id is only replaced when the profile carries a `sub`.
    pub fn set_credentials(
        &self,
        session: &SessionManager,
        token: Option<String>,
        user: Option<UserProfile>,
    ) -> Result<()> {
        let sub = user
            .as_ref()
            .and_then(|u| u.sub.clone())
            .filter(|s| !s.is_empty());

        if let Some(sub) = &sub {
            session.set_user_id(sub)?;
        }
        if let Some(user) = &user {
            session.set_user(user)?;
        }
        if let Some(token) = &token {
            session.set_token(token)?;
        }

        let mut credentials = self.write();
        credentials.token = token;
        credentials.user = user;
        if sub.is_some() {
            credentials.user_id = sub;
        }
        Ok(())
    }

    /// Drop the view credentials and clear the whole session.
    pub fn logout(&self, state: &AppState) -> Result<()> {
        *self.write() = Credentials::default();
        state.auth.logout()
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.credentials.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.credentials.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether `url` is the provider redirecting back to us.
pub fn is_callback(url: &Url) -> bool {
    url.query_pairs().any(|(k, _)| k == "code" || k == "error")
}

/// Finish a login from a callback URL and bring the view up to date.
pub async fn complete_login(state: &AppState, callback_url: &Url) -> Result<AuthorizedSession> {
    let authorized = state.auth.handle_callback(callback_url).await?;

    let profile = profile_from_id_token(&authorized.tokens);
    state.auth_view.set_credentials(
        &state.session,
        Some(authorized.tokens.access_token.clone()),
        Some(profile),
    )?;

    Ok(authorized)
}

/// Reconcile the view with the session on start-up.
///
/// A callback URL completes the login; otherwise an existing token is
/// adopted. Failures leave the user logged out.
pub async fn initialize(state: &AppState, current_url: Option<&Url>) -> Screen {
    match current_url.filter(|url| is_callback(url)) {
        Some(url) => {
            if let Err(e) = complete_login(state, url).await {
                tracing::error!(error = %e, "Login callback failed");
            }
        }
        None => {
            if let Some(token) = state.auth.get_access_token() {
                let user = state.session.user().unwrap_or_default();
                if let Err(e) = state
                    .auth_view
                    .set_credentials(&state.session, Some(token), Some(user))
                {
                    tracing::error!(error = %e, "Failed to restore credentials");
                }
            }
        }
    }

    state.auth_view.screen()
}

/// Screen shown while logged out.
pub fn render_logged_out() -> String {
    [
        "Track. Improve. Thrive.",
        "",
        "Sign in to start logging your workouts and get smart recommendations.",
        "Run `fitness-tracker login` to continue.",
    ]
    .join("\n")
}

/// One-line session summary.
pub fn render_status(credentials: &Credentials) -> String {
    if credentials.token.is_none() {
        return "Not logged in.".to_string();
    }

    let who = credentials
        .user
        .as_ref()
        .and_then(|u| u.display_name())
        .or(credentials.user_id.as_deref());

    match who {
        Some(who) => format!("Logged in as {}.", who),
        None => "Logged in.".to_string(),
    }
}
