// src/lib.rs
// Public library surface for integration tests and the binary.

pub mod api;
pub mod cache;
pub mod classify;
pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fallback;
pub mod ingest;
pub mod metrics;
pub mod service;
pub mod sources;
pub mod text;

use anyhow::Result;
use std::sync::Arc;

pub use crate::api::router;
pub use crate::classify::Category;
pub use crate::service::{NewsResponse, NewsService, Origin};

use crate::cache::{FileKvStore, KvStore, MemoryKvStore, NewsCache};
use crate::classify::Classifier;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::ingest::{http::HttpFeedClient, Fetcher};
use crate::sources::SourceRegistry;

/// Wire the production service from config: HTTP feeds, the system clock and
/// a file-backed cache (in-memory when no cache dir is configured).
pub fn build_service(cfg: &AppConfig) -> Result<NewsService> {
    let registry = SourceRegistry::load_default(cfg.sources_path.as_deref());
    let client = HttpFeedClient::new(&cfg.fetch)?;
    let fetcher = Fetcher::new(Arc::new(client), cfg.fetch.clone());

    let store: Arc<dyn KvStore> = match &cfg.cache.dir {
        Some(dir) => Arc::new(FileKvStore::new(dir.clone())?),
        None => Arc::new(MemoryKvStore::new()),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = NewsCache::new(store, clock.clone(), &cfg.cache);

    tracing::info!(
        target: "news",
        sources = registry.len(),
        cache_dir = ?cfg.cache.dir,
        ttl_secs = cfg.cache.ttl_secs,
        "news service configured"
    );

    Ok(NewsService::new(
        registry,
        fetcher,
        Classifier::new(cfg.classifier.clone()),
        cfg.dedup.clone(),
        cache,
        clock,
        cfg.pipeline.clone(),
    ))
}
