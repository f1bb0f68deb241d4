// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity models as exchanged with the fitness API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Kind of workout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    #[default]
    Running,
    Cycling,
    Swimming,
    /// Any type this client does not know about
    #[serde(other)]
    Other,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityType::Running => "RUNNING",
            ActivityType::Cycling => "CYCLING",
            ActivityType::Swimming => "SWIMMING",
            ActivityType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(ActivityType::Running),
            "CYCLING" => Ok(ActivityType::Cycling),
            "SWIMMING" => Ok(ActivityType::Swimming),
            other => Err(format!(
                "unknown activity type {other:?} (expected RUNNING, CYCLING or SWIMMING)"
            )),
        }
    }
}

/// Activity record returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    /// Owner (the `X-USER-ID` the activity was created with)
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type", default)]
    pub activity_type: Option<ActivityType>,
    /// Duration in minutes
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub calories_burned: Option<u32>,
    /// Start time (ISO 8601, no zone)
    #[serde(default)]
    pub start_time: Option<String>,
    /// Free-form metrics (heart rate, distance, elevation gain, ...)
    #[serde(default)]
    pub additional_metrics: Map<String, Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /activities`.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub activity_type: ActivityType,
    /// Duration in minutes
    #[validate(range(min = 1, max = 1440, message = "duration must be between 1 and 1440 minutes"))]
    pub duration: u32,
    #[validate(range(max = 100000, message = "calories burned must be at most 100000"))]
    pub calories_burned: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub additional_metrics: Map<String, Value>,
}

/// `GET /activities` body, either a plain list or a paginated wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActivityListResponse {
    Plain(Vec<Activity>),
    Paginated { content: Vec<Activity> },
    /// Anything else the server might send
    Unrecognized(Value),
}

impl ActivityListResponse {
    /// Flatten to the list of activities. Unrecognized shapes yield none.
    pub fn into_activities(self) -> Vec<Activity> {
        match self {
            ActivityListResponse::Plain(list) => list,
            ActivityListResponse::Paginated { content } => content,
            ActivityListResponse::Unrecognized(value) => {
                tracing::warn!(
                    kind = json_kind(&value),
                    "Unrecognized activity list response, treating as empty"
                );
                Vec::new()
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
