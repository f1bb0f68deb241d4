// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recommendation details for one activity.

use crate::models::Recommendation;
use crate::services::ViewKey;
use crate::time_utils::format_api_timestamp;
use crate::AppState;

/// What the details view shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    NotFound,
    Loaded(Box<Recommendation>),
}

/// Load the recommendation for `activity_id`.
///
/// Every API failure, 404 included, ends as [`DetailState::NotFound`].
/// `None` means a newer details request replaced this one.
pub async fn load_details(state: &AppState, activity_id: &str) -> Option<DetailState> {
    if activity_id.trim().is_empty() {
        return Some(DetailState::NotFound);
    }

    state
        .requests
        .run(ViewKey::ActivityDetails, async {
            match state.api.get_recommendation(activity_id).await {
                Ok(recommendation) => DetailState::Loaded(Box::new(recommendation)),
                Err(e) => {
                    tracing::error!(
                        activity_id,
                        status = ?e.api_status(),
                        error = %e,
                        "Error fetching recommendation"
                    );
                    DetailState::NotFound
                }
            }
        })
        .await
}

pub fn render_details(state: &DetailState) -> String {
    let rec = match state {
        DetailState::Loading => return "Loading...".to_string(),
        DetailState::NotFound => return "No recommendation found".to_string(),
        DetailState::Loaded(rec) => rec,
    };

    let mut out = String::from("Recommendation");
    if let Some(kind) = rec.activity_type.as_deref().filter(|k| !k.is_empty()) {
        out.push_str(&format!(" [{}]", kind));
    }
    out.push('\n');
    if let Some(created) = rec.created_at.as_deref() {
        out.push_str(&format_api_timestamp(created));
        out.push('\n');
    }

    out.push_str("\nOverview\n");
    let paragraphs = rec.paragraphs();
    if paragraphs.is_empty() {
        out.push_str("  No detailed text available.\n");
    }
    for paragraph in paragraphs {
        out.push_str(&format!("  {}\n", paragraph));
    }

    for (title, items) in [
        ("Improvements", &rec.improvements),
        ("Suggestions", &rec.suggestions),
        ("Safety", &rec.safety),
    ] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}\n", title));
        for item in items {
            out.push_str(&format!("  - {}\n", item));
        }
    }

    out.push_str(&format!(
        "\nRecommendation ID: {} | Activity ID: {} | User: {}",
        rec.id.as_deref().unwrap_or_default(),
        rec.activity_id.as_deref().unwrap_or_default(),
        rec.user_id.as_deref().unwrap_or_default(),
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_states() {
        assert_eq!(render_details(&DetailState::Loading), "Loading...");
        assert_eq!(render_details(&DetailState::NotFound), "No recommendation found");
    }

    #[test]
    fn test_render_skips_empty_sections() {
        let rec = Recommendation {
            id: Some("r1".to_string()),
            activity_id: Some("a1".to_string()),
            user_id: Some("user-42".to_string()),
            activity_type: Some("RUNNING".to_string()),
            recommendation: Some("Good pace.\n\nHydrate more.".to_string()),
            improvements: vec!["Longer warm-up".to_string()],
            created_at: Some("2026-03-01T08:20:00".to_string()),
            ..Default::default()
        };

        let rendered = render_details(&DetailState::Loaded(Box::new(rec)));

        assert!(rendered.starts_with("Recommendation [RUNNING]\n2026-03-01 08:20:00\n"));
        assert!(rendered.contains("  Good pace.\n  Hydrate more.\n"));
        assert!(rendered.contains("Improvements\n  - Longer warm-up"));
        assert!(!rendered.contains("Suggestions"));
        assert!(!rendered.contains("Safety"));
        assert!(rendered.ends_with("Recommendation ID: r1 | Activity ID: a1 | User: user-42"));
    }

    #[test]
    fn test_render_without_text() {
        let rendered = render_details(&DetailState::Loaded(Box::default()));
        assert!(rendered.contains("No detailed text available."));
    }
}
