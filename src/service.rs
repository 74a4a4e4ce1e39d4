// src/service.rs
//! Per-request orchestration:
//!
//! `cache hit → return`
//! `miss/stale/forced → fetch → classify → filter → dedup → cache write → return`
//! `nothing live → last known cache entry → static samples`
//!
//! The caller always gets a list back; failures only show up in logs,
//! metrics and the response `origin`.

use chrono::Duration;
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::NewsCache;
use crate::classify::{Category, Classifier};
use crate::clock::Clock;
use crate::dedup::{DedupConfig, Deduplicator, PublishedArticle};
use crate::fallback::fallback_articles;
use crate::ingest::Fetcher;
use crate::sources::SourceRegistry;
use crate::text::token_set;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cap on articles returned (and cached) per category.
    pub max_articles: usize,
    /// Items older than this are dropped before clustering; 0 disables.
    pub max_item_age_hours: u64,
    /// Feed languages to query; empty means all.
    pub languages: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_articles: 50,
            max_item_age_hours: 72,
            languages: vec!["en".to_string()],
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Cache,
    Live,
    StaleCache,
    Fallback,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Cache => "cache",
            Origin::Live => "live",
            Origin::StaleCache => "stale_cache",
            Origin::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsResponse {
    pub origin: Origin,
    pub articles: Vec<PublishedArticle>,
}

pub struct NewsService {
    registry: SourceRegistry,
    fetcher: Fetcher,
    classifier: Classifier,
    dedup: Deduplicator,
    cache: NewsCache,
    clock: Arc<dyn Clock>,
    pipeline: PipelineConfig,
}

impl NewsService {
    pub fn new(
        registry: SourceRegistry,
        fetcher: Fetcher,
        classifier: Classifier,
        dedup: DedupConfig,
        cache: NewsCache,
        clock: Arc<dyn Clock>,
        pipeline: PipelineConfig,
    ) -> Self {
        crate::ingest::ensure_metrics_described();
        Self {
            registry,
            fetcher,
            classifier,
            dedup: Deduplicator::new(dedup),
            cache,
            clock,
            pipeline,
        }
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// News for `category`. Never fails; see `Origin` for provenance.
    pub async fn fetch_news(&self, category: Category, force_refresh: bool) -> NewsResponse {
        if !force_refresh {
            if let Some(articles) = self.cache.get(category) {
                tracing::debug!(target: "news", %category, count = articles.len(), "served from cache");
                return NewsResponse {
                    origin: Origin::Cache,
                    articles,
                };
            }
        }

        let live = self.refresh(category).await;
        if !live.is_empty() {
            self.cache.set(category, live.clone());
            gauge!("news_last_refresh_ts").set(self.clock.now().timestamp() as f64);
            tracing::info!(target: "news", %category, count = live.len(), force_refresh, "served live");
            return NewsResponse {
                origin: Origin::Live,
                articles: live,
            };
        }

        counter!("news_fallback_total").increment(1);
        if let Some(entry) = self.cache.get_stale(category) {
            if !entry.articles.is_empty() {
                tracing::warn!(
                    target: "news",
                    %category,
                    last_fetched_at = %entry.last_fetched_at,
                    "no live news, serving last known cache"
                );
                return NewsResponse {
                    origin: Origin::StaleCache,
                    articles: entry.articles,
                };
            }
        }

        tracing::warn!(target: "news", %category, "no live or cached news, serving samples");
        NewsResponse {
            origin: Origin::Fallback,
            articles: fallback_articles(category, self.clock.now()),
        }
    }

    pub async fn fetch_news_articles(&self, category: Category, force_refresh: bool) -> Vec<PublishedArticle> {
        self.fetch_news(category, force_refresh).await.articles
    }

    /// Run the live pipeline once without touching the cache.
    pub async fn refresh(&self, category: Category) -> Vec<PublishedArticle> {
        let now = self.clock.now();
        let sources = self.registry.for_category(category, &self.pipeline.languages);
        if sources.is_empty() {
            tracing::warn!(target: "news", %category, "no sources configured for category");
            return Vec::new();
        }

        let report = self.fetcher.fetch_all(&sources, now).await;
        let fetched = report.items.len();
        let classified = self.classifier.classify_batch(report.items, &self.registry);

        // capped at a century so the conversion cannot overflow
        let max_age = Duration::hours(self.pipeline.max_item_age_hours.min(24 * 365 * 100) as i64);
        let relevant: Vec<_> = classified
            .into_iter()
            .filter(|it| self.pipeline.max_item_age_hours == 0 || now - it.raw.published_at <= max_age)
            .filter(|it| category == Category::All || it.category == category)
            .collect();
        let kept = relevant.len();

        let mut articles = self.dedup.deduplicate(relevant, now);
        articles.truncate(self.pipeline.max_articles.max(1));

        tracing::debug!(
            target: "news",
            %category,
            sources = sources.len(),
            fetched,
            kept,
            published = articles.len(),
            "pipeline run"
        );
        articles
    }

    /// Articles from the `all` feed whose title or summary contains every
    /// word of `query` (case-insensitive). Blank queries match nothing.
    pub async fn search_news(&self, query: &str) -> Vec<PublishedArticle> {
        let wanted = token_set(query);
        if wanted.is_empty() {
            return Vec::new();
        }

        self.fetch_news(Category::All, false)
            .await
            .articles
            .into_iter()
            .filter(|a| {
                let raw = &a.article.raw;
                let have = token_set(&format!("{} {}", raw.title, raw.summary.as_deref().unwrap_or_default()));
                wanted.is_subset(&have)
            })
            .collect()
    }

    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }

    pub fn clear_category(&self, category: Category) {
        self.cache.clear(category);
    }
}
