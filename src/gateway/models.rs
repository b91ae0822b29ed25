//! Wire types exchanged with the gateway

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A single item accepted for publish by `add_items`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    pub web_uri: String,
    pub object_key: String,
    pub content_type: String,
    #[serde(default)]
    pub link_to: String,
}

/// A publish object as returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub id: String,
    pub env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub links: HashMap<String, String>,
}

/// State of a gateway task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    NotStarted,
    InProgress,
    Complete,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Where a task stands from the client's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Pending,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn outcome(&self) -> TaskOutcome {
        match self {
            Self::Complete => TaskOutcome::Succeeded,
            Self::Failed => TaskOutcome::Failed,
            Self::NotStarted | Self::InProgress | Self::Unknown => TaskOutcome::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A task as returned by the gateway's commit and task endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_id: Option<String>,
    pub state: TaskState,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub links: HashMap<String, String>,
}

/// Naive timestamp layouts accepted as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a gateway timestamp, with or without a UTC offset
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

// An unreadable task timestamp decodes as `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

impl Task {
    /// URL to poll for this task's latest state
    ///
    /// Falls back to `/task/{id}` when the gateway did not advertise a link.
    pub fn poll_url(&self) -> Option<String> {
        match self.links.get("self") {
            Some(url) => Some(url.clone()),
            None if !self.id.is_empty() => Some(format!("/task/{}", self.id)),
            None => None,
        }
    }

    /// Human-readable reason for a failed task
    pub fn failure_detail(&self) -> String {
        let mut detail = self
            .error
            .clone()
            .unwrap_or_else(|| "gateway reported failure without detail".to_string());
        if let Some(deadline) = self.deadline
            && let Some(updated) = self.updated
            && updated >= deadline
        {
            detail.push_str(&format!(" (deadline {} passed)", deadline.to_rfc3339()));
        }
        detail
    }
}
