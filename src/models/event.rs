use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::timestamp;

/// A community event, table `events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "timestamp::option", default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_published: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl EventItem {
    pub fn capacity_label(&self) -> Option<String> {
        self.capacity
            .filter(|c| *c > 0)
            .map(|c| format!("{} spots available", c))
    }
}
