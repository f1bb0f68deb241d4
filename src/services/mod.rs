// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session, authentication and API access.

pub mod api;
pub mod oauth;
pub mod requests;
pub mod session;

pub use api::ApiClient;
pub use oauth::{AuthFlow, AuthorizedSession};
pub use requests::{RequestTracker, ViewKey};
pub use session::SessionManager;
