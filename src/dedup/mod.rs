// src/dedup/mod.rs
//! Deduplicator: groups classified items that report the same story and
//! publishes one representative per group.

pub mod scoring;
pub mod similarity;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::ClassifiedItem;
use crate::dedup::similarity::{similar_with, Features};

pub use scoring::{representative_score, ScoreConfig};
pub use similarity::is_similar;

pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.85;
pub const MAX_TIME_GAP_SECS: i64 = 4 * 3600;
pub const KEYWORD_OVERLAP_THRESHOLD: f64 = 0.7;
pub const KEYWORD_TITLE_FLOOR: f64 = 0.5;
pub const MIN_KEYWORD_CHARS: usize = 4;

/// How clusters grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// Single pass; an item joins a cluster when it matches the cluster's
    /// seed. Two members need not match each other, and re-running on the
    /// output can merge further when a non-seed member was published.
    SeedGreedy,
    /// Connected components of the full similarity graph. No two published
    /// representatives are similar, so a second pass is a no-op.
    #[default]
    Transitive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub title_threshold: f64,
    pub max_time_gap_secs: i64,
    pub keyword_overlap_threshold: f64,
    pub keyword_title_floor: f64,
    pub blend_edit_distance: bool,
    pub min_keyword_chars: usize,
    /// Capitalised words that are never part of a player name.
    pub name_stop_tokens: Vec<String>,
    pub strategy: ClusterStrategy,
    pub scoring: ScoreConfig,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            title_threshold: TITLE_SIMILARITY_THRESHOLD,
            max_time_gap_secs: MAX_TIME_GAP_SECS,
            keyword_overlap_threshold: KEYWORD_OVERLAP_THRESHOLD,
            keyword_title_floor: KEYWORD_TITLE_FLOOR,
            blend_edit_distance: true,
            min_keyword_chars: MIN_KEYWORD_CHARS,
            name_stop_tokens: default_name_stop_tokens(),
            strategy: ClusterStrategy::Transitive,
            scoring: ScoreConfig::default(),
        }
    }
}

fn default_name_stop_tokens() -> Vec<String> {
    [
        // clubs & competitions
        "United", "City", "Real", "Madrid", "Manchester", "Man", "Arsenal", "Chelsea",
        "Liverpool", "Tottenham", "Spurs", "Hotspur", "Barcelona", "Barca", "Bayern", "Munich",
        "Juventus", "Inter", "Milan", "Paris", "Saint", "Germain", "Atletico", "Borussia",
        "Dortmund", "Newcastle", "Everton", "Aston", "Villa", "West", "Ham", "Brighton",
        "Leicester", "Leeds", "Wolves", "Fulham", "Brentford", "Crystal", "Palace", "Nottingham",
        "Forest", "Bournemouth", "Napoli", "Roma", "Lazio", "Ajax", "Benfica", "Porto",
        "Sporting", "Celtic", "Rangers", "Premier", "League", "Champions", "Europa", "Liga",
        "Serie", "Bundesliga", "Cup", "England", "Spain", "France", "Germany", "Italy",
        // headline filler
        "Breaking", "Official", "Officially", "Here", "Done", "Deal", "Exclusive", "Report",
        "Transfer", "Transfers", "News", "Live", "Update", "Confirmed", "Confirms", "Signs",
        "Joins", "Completes", "Agrees", "Club", "The", "New", "Star", "Boss", "Manager",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// One representative item per story plus who else carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedArticle {
    #[serde(flatten)]
    pub article: ClassifiedItem,
    pub duplicate_count: usize,
    /// Other sources in the cluster, most trusted first.
    pub duplicate_sources: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    cfg: DedupConfig,
}

impl Deduplicator {
    pub fn new(cfg: DedupConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.cfg
    }

    /// Cluster `items` (indices into the input, first-seen order preserved).
    pub fn cluster(&self, items: &[ClassifiedItem]) -> Vec<Vec<usize>> {
        let feats: Vec<Features> = items.iter().map(|it| Features::of(it, &self.cfg)).collect();
        let similar = |i: usize, j: usize| similar_with(&items[i], &feats[i], &items[j], &feats[j], &self.cfg);

        match self.cfg.strategy {
            ClusterStrategy::SeedGreedy => {
                let mut visited = vec![false; items.len()];
                let mut clusters = Vec::new();
                for seed in 0..items.len() {
                    if visited[seed] {
                        continue;
                    }
                    visited[seed] = true;
                    let mut members = vec![seed];
                    for other in seed + 1..items.len() {
                        if !visited[other] && similar(seed, other) {
                            visited[other] = true;
                            members.push(other);
                        }
                    }
                    clusters.push(members);
                }
                clusters
            }
            ClusterStrategy::Transitive => {
                let mut sets = DisjointSets::new(items.len());
                for i in 0..items.len() {
                    for j in i + 1..items.len() {
                        if similar(i, j) {
                            sets.union(i, j);
                        }
                    }
                }
                sets.groups()
            }
        }
    }

    /// Cluster, pick representatives, sort newest first.
    pub fn deduplicate(&self, items: Vec<ClassifiedItem>, now: DateTime<Utc>) -> Vec<PublishedArticle> {
        let clusters = self.cluster(&items);
        let before = items.len();

        let mut slots: Vec<Option<ClassifiedItem>> = items.into_iter().map(Some).collect();
        let mut out = Vec::with_capacity(clusters.len());

        for members in clusters {
            let rep = self.pick_representative(&members, &slots, now);

            // one entry per non-representative member, repeats included
            let mut others: Vec<(u8, String)> = members
                .iter()
                .filter(|&&m| m != rep)
                .filter_map(|&m| slots[m].as_ref())
                .map(|it| (it.trust_score, it.raw.source_name.clone()))
                .collect();
            others.sort_by(|a, b| b.0.cmp(&a.0));
            let duplicate_sources: Vec<String> = others.into_iter().map(|(_, name)| name).collect();

            if let Some(article) = slots[rep].take() {
                out.push(PublishedArticle {
                    article,
                    duplicate_count: members.len() - 1,
                    duplicate_sources,
                });
            }
        }

        out.sort_by(|a, b| b.article.raw.published_at.cmp(&a.article.raw.published_at));

        tracing::debug!(target: "dedup", before, after = out.len(), "deduplicated");
        out
    }

    /// Highest score wins; the earliest member wins ties.
    fn pick_representative(
        &self,
        members: &[usize],
        slots: &[Option<ClassifiedItem>],
        now: DateTime<Utc>,
    ) -> usize {
        let mut best = members[0];
        let mut best_score = f64::NEG_INFINITY;
        for &m in members {
            if let Some(it) = slots[m].as_ref() {
                let s = representative_score(it, now, &self.cfg.scoring);
                if s > best_score {
                    best = m;
                    best_score = s;
                }
            }
        }
        best
    }
}

/// Convenience wrapper over `Deduplicator`.
pub fn deduplicate(
    items: Vec<ClassifiedItem>,
    now: DateTime<Utc>,
    cfg: &DedupConfig,
) -> Vec<PublishedArticle> {
    Deduplicator::new(cfg.clone()).deduplicate(items, now)
}

/// Union-find with path halving.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // keep the smaller index as root so groups order by first member
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }

    /// Groups in order of their first member, members ascending.
    fn groups(mut self) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut index_of_root: Vec<Option<usize>> = vec![None; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..n {
            let r = self.find(i);
            match index_of_root[r] {
                Some(g) => groups[g].push(i),
                None => {
                    index_of_root[r] = Some(groups.len());
                    groups.push(vec![i]);
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Category, TrustTier};
    use crate::ingest::types::RawItem;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, title: &str, source: &str, trust: u8, mins_ago: i64) -> ClassifiedItem {
        ClassifiedItem {
            raw: RawItem {
                id: id.into(),
                source_id: source.to_lowercase(),
                source_name: source.into(),
                title: title.into(),
                summary: None,
                link: format!("https://{}.test/{id}", source.to_lowercase()),
                published_at: now() - Duration::minutes(mins_ago),
                image_url: None,
            },
            category: Category::General,
            trust_score: trust,
            trust_tier: TrustTier::Reliable,
            matched_journalist: None,
        }
    }

    #[test]
    fn seed_greedy_is_not_transitive() {
        let cfg = DedupConfig {
            title_threshold: 0.6,
            blend_edit_distance: false,
            strategy: ClusterStrategy::SeedGreedy,
            ..DedupConfig::default()
        };
        let a = item("a", "alpha beta gamma delta epsilon", "A", 50, 0);
        let b = item("b", "alpha beta gamma delta zeta", "B", 50, 0);
        let c = item("c", "zeta beta gamma delta theta", "C", 50, 0);
        // a~b 4/6, b~c 4/6, a~c 3/7
        let greedy = Deduplicator::new(cfg.clone()).cluster(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(greedy, vec![vec![0, 1], vec![2]]);

        let transitive = Deduplicator::new(DedupConfig {
            strategy: ClusterStrategy::Transitive,
            ..cfg
        })
        .cluster(&[a, b, c]);
        assert_eq!(transitive, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn representative_is_highest_score_and_sources_sorted_by_trust() {
        let items = vec![
            item("1", "Rice completes switch to Arsenal", "Low", 40, 10),
            item("2", "Rice completes switch to Arsenal", "High", 95, 10),
            item("3", "Rice completes switch to Arsenal", "Mid", 70, 10),
        ];
        let out = Deduplicator::default().deduplicate(items, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].article.raw.source_name, "High");
        assert_eq!(out[0].duplicate_count, 2);
        assert_eq!(out[0].duplicate_sources, vec!["Mid".to_string(), "Low".to_string()]);
    }

    #[test]
    fn same_feed_members_are_each_listed() {
        let items = vec![
            item("1", "Rice completes switch to Arsenal", "High", 95, 10),
            item("2", "Rice completes switch to Arsenal", "Wire", 60, 12),
            item("3", "Rice completes switch to Arsenal", "Wire", 60, 14),
        ];
        let out = Deduplicator::default().deduplicate(items, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].duplicate_count, 2);
        assert_eq!(out[0].duplicate_sources, vec!["Wire".to_string(), "Wire".to_string()]);
        assert_eq!(out[0].duplicate_sources.len(), out[0].duplicate_count);
    }

    #[test]
    fn default_strategy_is_transitive() {
        assert_eq!(DedupConfig::default().strategy, ClusterStrategy::Transitive);
    }

    #[test]
    fn ties_keep_first_encountered() {
        let items = vec![
            item("1", "Rice completes switch to Arsenal", "First", 70, 10),
            item("2", "Rice completes switch to Arsenal", "Second", 70, 10),
        ];
        let out = Deduplicator::default().deduplicate(items, now());
        assert_eq!(out[0].article.raw.source_name, "First");
    }

    #[test]
    fn output_sorted_newest_first() {
        let items = vec![
            item("1", "Old story about a stadium plan", "A", 70, 300),
            item("2", "Fresh story about youth academy", "B", 70, 5),
            item("3", "Middle story on broadcast rights", "C", 70, 60),
        ];
        let out = Deduplicator::default().deduplicate(items, now());
        let ids: Vec<_> = out.iter().map(|p| p.article.raw.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        assert!(out.iter().all(|p| p.duplicate_count == 0 && p.duplicate_sources.is_empty()));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(Deduplicator::default().deduplicate(Vec::new(), now()).is_empty());
    }
}
