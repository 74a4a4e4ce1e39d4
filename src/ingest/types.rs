// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One feed entry in a uniform shape, before any classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawItem {
    pub id: String,          // short sha256 of the link
    pub source_id: String,   // registry id, e.g. "bbc_football"
    pub source_name: String, // display name, e.g. "BBC Sport"
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub link: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Transport seam: "fetch the body behind this URL".
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
