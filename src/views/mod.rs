// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Terminal views over the session and the API.

pub mod activities;
pub mod auth;
pub mod details;

pub use activities::{
    load_activities, render_activity_list, render_submit_error, submit_activity, ActivityForm,
};
pub use auth::{complete_login, initialize, AuthView, Credentials, Screen};
pub use details::{load_details, render_details, DetailState};
