// src/cache.rs
//! Two-layer article cache.
//!
//! - fast layer: in-process map, short TTL (default 60 s) counted from insertion;
//! - persistent layer: any `KvStore`, JSON-encoded `CacheEntry` per category,
//!   long TTL (default 30 min) counted from the entry's `last_fetched_at`.
//!
//! A fast miss falls through to the store; a store hit repopulates the fast
//! layer. `clear*` invalidates both. Writes are last-writer-wins and store
//! failures are logged, never surfaced.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::classify::Category;
use crate::clock::Clock;
use crate::dedup::PublishedArticle;

pub const DEFAULT_FAST_TTL_SECS: u64 = 60;
pub const DEFAULT_TTL_SECS: u64 = 1800;
const KEY_PREFIX: &str = "news_cache_";

/// Byte-oriented key-value persistence.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    inner: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let g = self.inner.lock().map_err(|_| anyhow::anyhow!("kv mutex poisoned"))?;
        Ok(g.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut g = self.inner.lock().map_err(|_| anyhow::anyhow!("kv mutex poisoned"))?;
        g.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut g = self.inner.lock().map_err(|_| anyhow::anyhow!("kv mutex poisoned"))?;
        g.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry under `dir`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        // write-then-rename so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub category: Category,
    pub articles: Vec<PublishedArticle>,
    pub last_fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub fast_ttl_secs: u64,
    pub ttl_secs: u64,
    /// Directory for the file store; `None` keeps everything in memory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fast_ttl_secs: DEFAULT_FAST_TTL_SECS,
            ttl_secs: DEFAULT_TTL_SECS,
            dir: Some(PathBuf::from("cache/news")),
        }
    }
}

#[derive(Debug, Clone)]
struct FastSlot {
    entry: CacheEntry,
    inserted_at: DateTime<Utc>,
}

pub struct NewsCache {
    fast: Mutex<HashMap<Category, FastSlot>>,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    fast_ttl: Duration,
    ttl: Duration,
}

fn secs(s: u64) -> Duration {
    Duration::seconds(i64::try_from(s).unwrap_or(i64::MAX / 1_000))
}

impl NewsCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, cfg: &CacheConfig) -> Self {
        Self {
            fast: Mutex::new(HashMap::new()),
            store,
            clock,
            fast_ttl: secs(cfg.fast_ttl_secs),
            ttl: secs(cfg.ttl_secs),
        }
    }

    pub fn key_for(category: Category) -> String {
        format!("{KEY_PREFIX}{category}")
    }

    /// Fresh articles for `category`, if any layer holds them.
    pub fn get(&self, category: Category) -> Option<Vec<PublishedArticle>> {
        let now = self.clock.now();

        if let Some(slot) = self.fast_slot(category) {
            if now - slot.inserted_at < self.fast_ttl && self.is_fresh(&slot.entry, now) {
                counter!("news_cache_hits_total", "layer" => "fast").increment(1);
                return Some(slot.entry.articles);
            }
        }

        match self.read_store(category) {
            Some(entry) if self.is_fresh(&entry, now) => {
                counter!("news_cache_hits_total", "layer" => "persistent").increment(1);
                let articles = entry.articles.clone();
                self.put_fast(entry, now);
                Some(articles)
            }
            _ => {
                counter!("news_cache_misses_total").increment(1);
                None
            }
        }
    }

    /// Last known entry regardless of age.
    pub fn get_stale(&self, category: Category) -> Option<CacheEntry> {
        self.fast_slot(category)
            .map(|s| s.entry)
            .or_else(|| self.read_store(category))
    }

    pub fn set(&self, category: Category, articles: Vec<PublishedArticle>) {
        let now = self.clock.now();
        let entry = CacheEntry {
            category,
            articles,
            last_fetched_at: now,
        };

        match serde_json::to_vec(&entry) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(&Self::key_for(category), &bytes) {
                    tracing::warn!(target: "cache", %category, error = ?e, "persistent cache write failed");
                }
            }
            Err(e) => tracing::warn!(target: "cache", %category, error = %e, "cache entry encode failed"),
        }
        self.put_fast(entry, now);
    }

    /// True while the entry for `category` is younger than the TTL.
    pub fn is_valid(&self, category: Category) -> bool {
        let now = self.clock.now();
        self.get_stale(category)
            .is_some_and(|e| self.is_fresh(&e, now))
    }

    /// When `category` was last written, if ever.
    pub fn last_fetched_at(&self, category: Category) -> Option<DateTime<Utc>> {
        self.get_stale(category).map(|e| e.last_fetched_at)
    }

    pub fn clear(&self, category: Category) {
        self.fast_layer().remove(&category);
        if let Err(e) = self.store.remove(&Self::key_for(category)) {
            tracing::warn!(target: "cache", %category, error = ?e, "persistent cache remove failed");
        }
    }

    pub fn clear_all(&self) {
        for category in Category::ALL_SCOPES {
            self.clear(category);
        }
        tracing::info!(target: "cache", "news cache cleared");
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_fetched_at < self.ttl
    }

    fn fast_slot(&self, category: Category) -> Option<FastSlot> {
        self.fast_layer().get(&category).cloned()
    }

    fn put_fast(&self, entry: CacheEntry, now: DateTime<Utc>) {
        self.fast_layer().insert(
            entry.category,
            FastSlot {
                entry,
                inserted_at: now,
            },
        );
    }

    // The map holds no cross-entry invariant, so a poisoned guard is still usable.
    fn fast_layer(&self) -> MutexGuard<'_, HashMap<Category, FastSlot>> {
        self.fast.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_store(&self, category: Category) -> Option<CacheEntry> {
        let key = Self::key_for(category);
        let bytes = match self.store.get(&key) {
            Ok(b) => b?,
            Err(e) => {
                tracing::warn!(target: "cache", %category, error = ?e, "persistent cache read failed");
                return None;
            }
        };
        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(target: "cache", %category, error = %e, "dropping undecodable cache entry");
                let _ = self.store.remove(&key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn cache_with(store: Arc<dyn KvStore>) -> (NewsCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()));
        let cache = NewsCache::new(store, clock.clone(), &CacheConfig::default());
        (cache, clock)
    }

    #[test]
    fn clear_reaches_a_poisoned_fast_layer() {
        let (cache, _) = cache_with(Arc::new(MemoryKvStore::new()));
        cache.set(Category::Match, Vec::new());

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.fast.lock();
            panic!("writer died holding the fast layer");
        }));
        assert!(cache.fast.is_poisoned());

        cache.clear(Category::Match);
        assert!(cache.get(Category::Match).is_none());

        cache.set(Category::Injury, Vec::new());
        assert!(cache.fast_slot(Category::Injury).is_some());
    }

    #[test]
    fn undecodable_entries_are_misses_and_removed() {
        let store = Arc::new(MemoryKvStore::new());
        store.set(&NewsCache::key_for(Category::Match), b"not json").unwrap();
        let (cache, _) = cache_with(store.clone());
        assert!(cache.get(Category::Match).is_none());
        assert!(store.get(&NewsCache::key_for(Category::Match)).unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("nested")).unwrap();
        assert!(store.get("news_cache_all").unwrap().is_none());
        store.set("news_cache_all", b"[1,2]").unwrap();
        assert_eq!(store.get("news_cache_all").unwrap().as_deref(), Some(&b"[1,2]"[..]));
        store.remove("news_cache_all").unwrap();
        store.remove("news_cache_all").unwrap();
        assert!(store.get("news_cache_all").unwrap().is_none());
    }

    #[test]
    fn keys_are_per_category() {
        assert_eq!(NewsCache::key_for(Category::Transfer), "news_cache_transfer");
        let (cache, _) = cache_with(Arc::new(MemoryKvStore::new()));
        cache.set(Category::Transfer, Vec::new());
        assert!(cache.is_valid(Category::Transfer));
        assert!(!cache.is_valid(Category::Injury));
    }
}
