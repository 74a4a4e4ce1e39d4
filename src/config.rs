// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CacheConfig;
use crate::classify::ClassifierConfig;
use crate::dedup::DedupConfig;
use crate::ingest::scheduler::RefreshConfig;
use crate::ingest::FetchConfig;
use crate::service::PipelineConfig;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "NEWS_CACHE_TTL_SECS";
pub const ENV_CACHE_DIR: &str = "NEWS_CACHE_DIR";
pub const DEFAULT_CONFIG_PATH: &str = "config/news.toml";

/// Everything the service reads at startup. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub pipeline: PipelineConfig,
    pub dedup: DedupConfig,
    pub classifier: ClassifierConfig,
    pub refresh: RefreshConfig,
    /// TOML/JSON source table; the built-in seed is used when unset.
    pub sources_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $NEWS_CONFIG_PATH (must exist)
    /// 2) config/news.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var(ENV_CACHE_TTL_SECS) {
            self.cache.ttl_secs = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CACHE_TTL_SECS}={v} is not a number of seconds"))?;
        }
        if let Ok(v) = std::env::var(ENV_CACHE_DIR) {
            let v = v.trim();
            // empty means in-memory only
            self.cache.dir = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        Ok(())
    }
}
