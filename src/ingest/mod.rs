// src/ingest/mod.rs
pub mod http;
pub mod rss;
pub mod scheduler;
pub mod types;

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchError;
use crate::ingest::types::{FeedClient, RawItem};
use crate::sources::FeedSource;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_fetch_sources_total", "Feed fetches attempted.");
        describe_counter!(
            "news_fetch_errors_total",
            "Feed fetches that ended without items, by error kind."
        );
        describe_counter!("news_items_fetched_total", "Items parsed from feeds.");
        describe_counter!("news_cache_hits_total", "Cache hits by layer.");
        describe_counter!("news_cache_misses_total", "Cache misses.");
        describe_counter!(
            "news_fallback_total",
            "Requests answered from stale cache or the static sample set."
        );
        describe_counter!("news_refresh_runs_total", "Scheduled refreshes by response origin.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("news_cache_ttl_secs", "Configured persistent cache TTL.");
        describe_gauge!(
            "news_last_refresh_ts",
            "Unix ts of the last successful live refresh."
        );
    });
}

/// Normalize feed text: decode entities, strip tags, straighten quotes,
/// collapse whitespace, cap at `max_chars`.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    out = out.split_whitespace().collect::<Vec<_>>().join(" ");

    // 5) Length cap
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect();
    }

    out
}

/// Stable short id for an item: sha256 of its link (title when there is none).
pub fn item_id(link: &str, title: &str) -> String {
    use sha2::{Digest, Sha256};
    let key = if link.is_empty() { title } else { link };
    let digest = Sha256::digest(key.as_bytes());
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Budget for a single HTTP attempt.
    pub per_source_timeout_ms: u64,
    /// Budget for the whole fan-out; sources still running are dropped.
    pub overall_deadline_ms: u64,
    /// Total attempts per source (1 = no retry).
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_source_timeout_ms: 8_000,
            overall_deadline_ms: 20_000,
            max_attempts: 2,
            retry_backoff_ms: 500,
            user_agent: concat!("matchday-news/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn per_source_timeout(&self) -> Duration {
        Duration::from_millis(self.per_source_timeout_ms.max(1))
    }

    pub fn overall_deadline(&self) -> Duration {
        Duration::from_millis(self.overall_deadline_ms.max(1))
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Outcome of one fan-out over a set of feeds.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub items: Vec<RawItem>,
    /// Sources that answered with a parseable feed (possibly empty).
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, FetchError)>,
    /// Sources still pending when the overall deadline fired.
    pub abandoned: Vec<String>,
}

impl FetchReport {
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }
}

/// Reject anything that is not an absolute http(s) URL before touching the network.
pub fn validate_url(url: &str) -> Result<(), FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Concurrent feed fetcher: one future per source, each with its own
/// timeout and bounded retry, all under one overall deadline.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn FeedClient>,
    cfg: FetchConfig,
}

impl Fetcher {
    pub fn new(client: Arc<dyn FeedClient>, cfg: FetchConfig) -> Self {
        Self { client, cfg }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.cfg
    }

    /// Fetch and parse every source concurrently. Never fails: broken
    /// sources are reported in `failed`, slow ones in `abandoned`.
    pub async fn fetch_all(&self, sources: &[FeedSource], fetched_at: DateTime<Utc>) -> FetchReport {
        ensure_metrics_described();
        let mut report = FetchReport::default();
        if sources.is_empty() {
            return report;
        }

        let mut pending: FuturesUnordered<_> = sources
            .iter()
            .map(|src| async move { (src, self.fetch_source(src, fetched_at).await) })
            .collect();
        let mut finished: HashSet<&str> = HashSet::with_capacity(sources.len());

        let deadline = tokio::time::sleep(self.cfg.overall_deadline());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                next = pending.next() => {
                    let Some((src, outcome)) = next else { break };
                    finished.insert(src.id.as_str());
                    counter!("news_fetch_sources_total").increment(1);
                    match outcome {
                        Ok(mut items) => {
                            tracing::debug!(target: "ingest", source = %src.id, items = items.len(), "feed fetched");
                            report.succeeded.push(src.id.clone());
                            report.items.append(&mut items);
                        }
                        Err(e) => {
                            tracing::warn!(target: "ingest", source = %src.id, error = %e, "feed skipped");
                            counter!("news_fetch_errors_total", "kind" => e.kind()).increment(1);
                            report.failed.push((src.id.clone(), e));
                        }
                    }
                }
                _ = &mut deadline => {
                    report.abandoned = sources
                        .iter()
                        .filter(|s| !finished.contains(s.id.as_str()))
                        .map(|s| s.id.clone())
                        .collect();
                    tracing::warn!(
                        target: "ingest",
                        abandoned = ?report.abandoned,
                        deadline_ms = self.cfg.overall_deadline_ms,
                        "fetch deadline reached, dropping pending sources"
                    );
                    break;
                }
            }
        }

        tracing::info!(
            target: "ingest",
            ok = report.succeeded.len(),
            failed = report.failed.len(),
            abandoned = report.abandoned.len(),
            items = report.items.len(),
            "fetch round finished"
        );
        report
    }

    async fn fetch_source(
        &self,
        source: &FeedSource,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<RawItem>, FetchError> {
        validate_url(&source.url)?;

        let per_attempt = self.cfg.per_source_timeout();
        let max_attempts = self.cfg.max_attempts.max(1);
        let mut attempt = 0u32;

        let body = loop {
            attempt += 1;
            let res = match tokio::time::timeout(per_attempt, self.client.fetch(&source.url)).await {
                Ok(r) => r,
                Err(_) => Err(FetchError::Timeout(per_attempt)),
            };
            match res {
                Ok(body) => break body,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::debug!(target: "ingest", source = %source.id, attempt, error = %e, "retrying feed");
                    tokio::time::sleep(self.cfg.retry_backoff()).await;
                }
                Err(e) => return Err(e),
            }
        };

        rss::parse_feed(&body, source, fetched_at)
    }
}
