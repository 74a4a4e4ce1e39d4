// tests/common/mod.rs
//
// Shared doubles for integration tests: a scripted feed client and a
// service wired with a manual clock and an in-memory store.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use matchday_news::cache::{CacheConfig, KvStore, MemoryKvStore, NewsCache};
use matchday_news::classify::{Category, Classifier};
use matchday_news::clock::ManualClock;
use matchday_news::dedup::DedupConfig;
use matchday_news::error::FetchError;
use matchday_news::ingest::types::FeedClient;
use matchday_news::ingest::{FetchConfig, Fetcher};
use matchday_news::service::{NewsService, PipelineConfig};
use matchday_news::sources::{FeedSource, SourceKind, SourceRegistry};

pub const OFFICIAL_CLUB_XML: &str = include_str!("../fixtures/official_club.xml");
pub const RUMOUR_A_XML: &str = include_str!("../fixtures/rumour_mill_a.xml");
pub const RUMOUR_B_XML: &str = include_str!("../fixtures/rumour_mill_b.xml");
pub const MIXED_FEED_XML: &str = include_str!("../fixtures/mixed_feed.xml");

pub const OFFICIAL_URL: &str = "https://riverside-fc.test/rss";
pub const RUMOUR_A_URL: &str = "https://rumour-a.test/rss";
pub const RUMOUR_B_URL: &str = "https://rumour-b.test/rss";
pub const MIXED_URL: &str = "https://football-daily.test/rss";

/// Fixture feeds are stamped on the morning of 2025-08-01.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
}

#[derive(Clone, Debug)]
pub enum Reply {
    Body(String),
    Fail(FetchError),
    Delayed(Duration, String),
}

impl Reply {
    pub fn body(xml: &str) -> Self {
        Reply::Body(xml.to_string())
    }

    pub fn network() -> Self {
        Reply::Fail(FetchError::Network("connection refused".into()))
    }
}

/// Replies are consumed in order per URL; the last one repeats.
/// Unknown URLs fail with a network error.
#[derive(Default)]
pub struct StubFeedClient {
    replies: Mutex<HashMap<String, Vec<Reply>>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl StubFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, url: &str, replies: Vec<Reply>) -> Self {
        self.set(url, replies);
        self
    }

    pub fn set(&self, url: &str, replies: Vec<Reply>) {
        self.replies.lock().insert(url.to_string(), replies);
    }

    pub fn fail_everything(&self) {
        let mut g = self.replies.lock();
        for replies in g.values_mut() {
            *replies = vec![Reply::network()];
        }
    }

    pub fn calls(&self, url: &str) -> u32 {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().values().sum()
    }
}

#[async_trait::async_trait]
impl FeedClient for StubFeedClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.calls.lock().entry(url.to_string()).or_default() += 1;
        let reply = {
            let mut g = self.replies.lock();
            match g.get_mut(url) {
                Some(q) if q.len() > 1 => q.remove(0),
                Some(q) if !q.is_empty() => q[0].clone(),
                _ => Reply::network(),
            }
        };
        match reply {
            Reply::Body(b) => Ok(b),
            Reply::Fail(e) => Err(e),
            Reply::Delayed(d, b) => {
                tokio::time::sleep(d).await;
                Ok(b)
            }
        }
    }
}

pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        per_source_timeout_ms: 500,
        overall_deadline_ms: 2_000,
        max_attempts: 2,
        retry_backoff_ms: 10,
        ..FetchConfig::default()
    }
}

pub fn scenario_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new(
            "riverside_official",
            OFFICIAL_URL,
            "Riverside FC",
            100,
            SourceKind::Official,
            &[Category::Transfer],
            "en",
        ),
        FeedSource::new(
            "rumour_mill_a",
            RUMOUR_A_URL,
            "Rumour Mill A",
            60,
            SourceKind::Aggregator,
            &[Category::Transfer],
            "en",
        ),
        FeedSource::new(
            "rumour_mill_b",
            RUMOUR_B_URL,
            "Rumour Mill B",
            60,
            SourceKind::Aggregator,
            &[Category::Transfer],
            "en",
        ),
    ]
}

pub fn scenario_client() -> StubFeedClient {
    StubFeedClient::new()
        .on(OFFICIAL_URL, vec![Reply::body(OFFICIAL_CLUB_XML)])
        .on(RUMOUR_A_URL, vec![Reply::body(RUMOUR_A_XML)])
        .on(RUMOUR_B_URL, vec![Reply::body(RUMOUR_B_XML)])
}

pub struct Harness {
    pub service: Arc<NewsService>,
    pub client: Arc<StubFeedClient>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryKvStore>,
}

pub fn harness(sources: Vec<FeedSource>, client: StubFeedClient) -> Harness {
    let client = Arc::new(client);
    let clock = Arc::new(ManualClock::new(t0()));
    let store = Arc::new(MemoryKvStore::new());

    let fetcher = Fetcher::new(client.clone(), fast_fetch_config());
    let cache = NewsCache::new(
        store.clone() as Arc<dyn KvStore>,
        clock.clone(),
        &CacheConfig {
            dir: None,
            ..CacheConfig::default()
        },
    );
    let service = NewsService::new(
        SourceRegistry::new(sources),
        fetcher,
        Classifier::default(),
        DedupConfig::default(),
        cache,
        clock.clone(),
        PipelineConfig::default(),
    );

    Harness {
        service: Arc::new(service),
        client,
        clock,
        store,
    }
}
