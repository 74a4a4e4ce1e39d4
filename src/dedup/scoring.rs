// src/dedup/scoring.rs
//! Representative selection score:
//! `trust×40 + content_quality×30 + max(0, 20 − hours×2) + title_quality×10`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::ClassifiedItem;

pub const TRUST_WEIGHT: f64 = 40.0;
pub const CONTENT_WEIGHT: f64 = 30.0;
pub const RECENCY_MAX: f64 = 20.0;
pub const RECENCY_DECAY_PER_HOUR: f64 = 2.0;
pub const TITLE_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub trust_weight: f64,
    pub content_weight: f64,
    pub recency_max: f64,
    pub recency_decay_per_hour: f64,
    pub title_weight: f64,
    /// Symbols and words that flag a breaking/confirmed headline.
    pub marker_symbols: Vec<String>,
    pub clickbait_phrases: Vec<String>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            trust_weight: TRUST_WEIGHT,
            content_weight: CONTENT_WEIGHT,
            recency_max: RECENCY_MAX,
            recency_decay_per_hour: RECENCY_DECAY_PER_HOUR,
            title_weight: TITLE_WEIGHT,
            marker_symbols: ["🚨", "🔴", "⚡", "✅", "🔥", "breaking", "exclusive"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            clickbait_phrases: [
                "you won't believe",
                "shocking",
                "unbelievable",
                "insane",
                "must see",
                "what happened next",
                "jaw-dropping",
                "gone wrong",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Summary length bands, plus a small bonus for carrying an image.
pub fn content_quality(item: &ClassifiedItem) -> f64 {
    let len = item
        .raw
        .summary
        .as_deref()
        .map(|s| s.chars().count())
        .unwrap_or(0);
    let base: f64 = match len {
        0 => 0.0,
        1..=49 => 0.3,
        50..=149 => 0.6,
        150..=500 => 1.0,
        _ => 0.8,
    };
    let image = if item.raw.image_url.is_some() { 0.1 } else { 0.0 };
    (base + image).min(1.0)
}

pub fn title_quality(title: &str, cfg: &ScoreConfig) -> f64 {
    let len = title.chars().count();
    let mut q: f64 = match len {
        0..=19 => 0.4,
        20..=100 => 1.0,
        _ => 0.6,
    };
    let lower = title.to_lowercase();
    if cfg.marker_symbols.iter().any(|m| lower.contains(&m.to_lowercase())) {
        q += 0.1;
    }
    if cfg.clickbait_phrases.iter().any(|p| lower.contains(&p.to_lowercase())) {
        q -= 0.3;
    }
    q.clamp(0.0, 1.0)
}

/// Hours between publication and `now`; items stamped in the future count as fresh.
pub fn hours_since(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - published_at).num_seconds().max(0) as f64 / 3600.0
}

pub fn representative_score(item: &ClassifiedItem, now: DateTime<Utc>, cfg: &ScoreConfig) -> f64 {
    let trust = f64::from(item.trust_score.min(100)) / 100.0;
    let recency =
        (cfg.recency_max - hours_since(item.raw.published_at, now) * cfg.recency_decay_per_hour).max(0.0);
    trust * cfg.trust_weight
        + content_quality(item) * cfg.content_weight
        + recency
        + title_quality(&item.raw.title, cfg) * cfg.title_weight
}
