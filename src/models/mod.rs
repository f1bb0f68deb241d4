// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod recommendation;
pub mod token;
pub mod user;

pub use activity::{Activity, ActivityListResponse, ActivityType, NewActivity};
pub use recommendation::Recommendation;
pub use token::TokenResponse;
pub use user::{Session, UserProfile};
