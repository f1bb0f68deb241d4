// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! AI-generated recommendation for a logged activity.

use serde::{Deserialize, Serialize};

/// Recommendation returned by `GET /recommendations/activity/{id}`.
///
/// Every field is optional on the wire; the generator may omit sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub id: Option<String>,
    pub activity_id: Option<String>,
    pub user_id: Option<String>,
    pub activity_type: Option<String>,
    /// Free text overview, paragraphs separated by newlines
    pub recommendation: Option<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub safety: Vec<String>,
    /// Creation time (ISO 8601, usually without zone)
    pub created_at: Option<String>,
}

impl Recommendation {
    /// Overview paragraphs: text split on newlines, trimmed, blanks dropped.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.recommendation
            .as_deref()
            .unwrap_or_default()
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}
