// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity list and activity form.

use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityType, NewActivity};
use crate::services::ViewKey;
use crate::AppState;

/// Fetch the activity list for display.
///
/// API failures are logged and shown as an empty list. `None` means a newer
/// list request replaced this one.
pub async fn load_activities(state: &AppState) -> Option<Vec<Activity>> {
    state
        .requests
        .run(ViewKey::ActivityList, async {
            match state.api.list_activities().await {
                Ok(activities) => activities,
                Err(e) => {
                    tracing::error!(status = ?e.api_status(), error = %e, "Error fetching activities");
                    Vec::new()
                }
            }
        })
        .await
}

pub fn render_activity_list(activities: &[Activity]) -> String {
    if activities.is_empty() {
        return "No activities yet.".to_string();
    }

    activities
        .iter()
        .map(|activity| {
            let kind = activity
                .activity_type
                .map(|t| t.to_string())
                .unwrap_or_default();
            format!(
                "[{}]\n  Type: {}\n  Duration: {} minutes\n  Calories Burned: {}",
                activity.id,
                kind,
                display_opt(activity.duration),
                display_opt(activity.calories_burned),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn display_opt(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ActivityForm {
    /// Empty means `RUNNING`
    pub activity_type: String,
    pub duration: String,
    pub calories_burned: String,
    /// `key=value` pairs for additional metrics
    pub metrics: Vec<String>,
}

impl ActivityForm {
    /// Parse and validate the form into an API request body.
    pub fn to_new_activity(&self) -> Result<NewActivity> {
        let activity_type = if self.activity_type.trim().is_empty() {
            ActivityType::default()
        } else {
            self.activity_type
                .parse()
                .map_err(AppError::BadRequest)?
        };

        let activity = NewActivity {
            activity_type,
            duration: parse_number("duration", &self.duration)?,
            calories_burned: parse_number("calories burned", &self.calories_burned)?,
            start_time: None,
            additional_metrics: parse_metrics(&self.metrics)?,
        };

        activity
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(activity)
    }
}

fn parse_number(field: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{field} must be a whole number, got {raw:?}")))
}

/// `heartRate=140` becomes `{"heartRate": 140}`; non-JSON values stay strings.
fn parse_metrics(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut metrics = Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("metric must be key=value, got {pair:?}")))?;

        let value = value.trim();
        let parsed = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        metrics.insert(key.trim().to_string(), parsed);
    }
    Ok(metrics)
}

/// Submit the form. The caller reloads the list on success.
pub async fn submit_activity(state: &AppState, form: &ActivityForm) -> Result<Activity> {
    let activity = form.to_new_activity()?;
    match state.api.create_activity(&activity).await {
        Ok(created) => {
            tracing::info!(activity_id = %created.id, "Activity added");
            Ok(created)
        }
        Err(e) => {
            tracing::error!(status = ?e.api_status(), error = %e, "Error adding activity");
            Err(e)
        }
    }
}

/// Message for a failed submission. Form errors are shown as they are; API
/// failures only get a short notice, the details are in the log.
pub fn render_submit_error(error: &AppError) -> String {
    match error {
        AppError::BadRequest(msg) => format!("Invalid activity: {}", msg),
        _ => "Could not add the activity. Please try again.".to_string(),
    }
}
