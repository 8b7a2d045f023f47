use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::timestamp;

/// An announcement, table `announcements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_published: bool,
    #[serde(with = "timestamp")]
    pub published_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
}
