// src/ingest/scheduler.rs
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::classify::Category;
use crate::service::NewsService;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between background refreshes; 0 disables the scheduler.
    pub interval_secs: u64,
    pub categories: Vec<Category>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 0,
            categories: vec![Category::All, Category::Transfer],
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

/// Spawn a background task that force-refreshes `categories` every `interval`,
/// keeping the cache warm so requests rarely pay for a live fetch.
/// The first tick fires immediately.
pub fn spawn_refresh_scheduler(
    service: Arc<NewsService>,
    interval: Duration,
    categories: Vec<Category>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            for &category in &categories {
                let resp = service.fetch_news(category, true).await;
                counter!("news_refresh_runs_total", "origin" => resp.origin.as_str()).increment(1);
                tracing::info!(
                    target: "ingest",
                    %category,
                    origin = resp.origin.as_str(),
                    count = resp.articles.len(),
                    "scheduled refresh"
                );
            }
        }
    })
}
