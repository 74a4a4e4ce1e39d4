//! # Source Registry
//!
//! Static catalogue of the RSS feeds the aggregator pulls from. Each entry
//! carries a trust weight in `0..=100`, a kind (official club/league outlet,
//! tier-one media, transfer specialist, aggregator), the categories it is
//! worth querying for and its language.
//!
//! - Loads from TOML or JSON (`[[sources]]` table / `{"sources": [...]}`).
//! - Falls back to the built-in `default_seed()` when no file is configured
//!   or the file cannot be read.
//! - Weights are clamped to 100; duplicate ids keep the first entry.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

use crate::classify::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Official,
    Tier1Media,
    TransferSpecialist,
    Aggregator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: String,
    pub url: String,
    pub name: String,
    pub trust_weight: u8,
    pub kind: SourceKind,
    /// Categories this feed is queried for; `general` feeds serve every request.
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl FeedSource {
    pub fn new(
        id: &str,
        url: &str,
        name: &str,
        trust_weight: u8,
        kind: SourceKind,
        categories: &[Category],
        language: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            name: name.to_string(),
            trust_weight: trust_weight.min(100),
            kind,
            categories: categories.to_vec(),
            language: language.to_string(),
        }
    }

    /// Whether this feed should be fetched for `category`.
    pub fn serves(&self, category: Category) -> bool {
        category == Category::All
            || self.categories.is_empty()
            || self.categories.contains(&category)
            || self.categories.contains(&Category::General)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<FeedSource>,
}

#[derive(Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<FeedSource>,
}

impl SourceRegistry {
    /// Build from a list, clamping weights and dropping duplicate ids.
    pub fn new(sources: Vec<FeedSource>) -> Self {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(sources.len());
        for mut s in sources {
            if !seen.insert(s.id.clone()) {
                tracing::warn!(target: "sources", id = %s.id, "duplicate source id ignored");
                continue;
            }
            s.trust_weight = s.trust_weight.min(100);
            out.push(s);
        }
        Self { sources: out }
    }

    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_sources(&content, &ext).map(Self::new)
    }

    /// Load from `path` if given, falling back to the built-in seed on any error.
    pub fn load_default(path: Option<&Path>) -> Self {
        match path {
            Some(p) => match Self::load_from(p) {
                Ok(reg) if !reg.is_empty() => reg,
                Ok(_) => {
                    tracing::warn!(target: "sources", path = %p.display(), "empty sources file, using seed");
                    Self::default_seed()
                }
                Err(e) => {
                    tracing::warn!(target: "sources", error = ?e, "failed to load sources, using seed");
                    Self::default_seed()
                }
            },
            None => Self::default_seed(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FeedSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn all(&self) -> &[FeedSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Feeds relevant to `category`, optionally limited to `languages`
    /// (case-insensitive; empty slice means any language).
    pub fn for_category(&self, category: Category, languages: &[String]) -> Vec<FeedSource> {
        self.sources
            .iter()
            .filter(|s| s.serves(category))
            .filter(|s| {
                languages.is_empty() || languages.iter().any(|l| l.eq_ignore_ascii_case(&s.language))
            })
            .cloned()
            .collect()
    }

    /// Built-in catalogue used when no sources file is configured.
    pub fn default_seed() -> Self {
        use Category::*;
        use SourceKind::*;

        Self::new(vec![
            FeedSource::new(
                "uefa_news",
                "https://www.uefa.com/rssfeed/news/rss.xml",
                "UEFA.com",
                100,
                Official,
                &[Match, Injury],
                "en",
            ),
            FeedSource::new(
                "bbc_football",
                "https://feeds.bbci.co.uk/sport/football/rss.xml",
                "BBC Sport",
                90,
                Tier1Media,
                &[General],
                "en",
            ),
            FeedSource::new(
                "guardian_football",
                "https://www.theguardian.com/football/rss",
                "The Guardian",
                88,
                Tier1Media,
                &[General],
                "en",
            ),
            FeedSource::new(
                "sky_football",
                "https://www.skysports.com/rss/12040",
                "Sky Sports",
                85,
                Tier1Media,
                &[General],
                "en",
            ),
            FeedSource::new(
                "sky_transfers",
                "https://www.skysports.com/rss/11095",
                "Sky Sports Transfer Centre",
                82,
                TransferSpecialist,
                &[Transfer],
                "en",
            ),
            FeedSource::new(
                "espn_fc",
                "https://www.espn.com/espn/rss/soccer/news",
                "ESPN FC",
                80,
                Tier1Media,
                &[Match, Transfer, Injury],
                "en",
            ),
            FeedSource::new(
                "goal",
                "https://www.goal.com/feeds/en/news",
                "Goal",
                65,
                Aggregator,
                &[General],
                "en",
            ),
            FeedSource::new(
                "ninety_min",
                "https://www.90min.com/posts.rss",
                "90min",
                60,
                Aggregator,
                &[Transfer, Match],
                "en",
            ),
            FeedSource::new(
                "marca_futbol",
                "https://e00-marca.uecdn.es/rss/futbol/primera-division.xml",
                "Marca",
                80,
                Tier1Media,
                &[General],
                "es",
            ),
            FeedSource::new(
                "kicker_fussball",
                "https://newsfeed.kicker.de/news/fussball",
                "kicker",
                82,
                Tier1Media,
                &[General],
                "de",
            ),
        ])
    }
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<FeedSource>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(f) = toml::from_str::<SourcesFile>(s) {
            return Ok(f.sources);
        }
    }
    if let Ok(f) = serde_json::from_str::<SourcesFile>(s) {
        return Ok(f.sources);
    }
    if let Ok(list) = serde_json::from_str::<Vec<FeedSource>>(s) {
        return Ok(list);
    }
    if !try_toml {
        if let Ok(f) = toml::from_str::<SourcesFile>(s) {
            return Ok(f.sources);
        }
    }
    Err(anyhow!("unsupported sources format"))
}
