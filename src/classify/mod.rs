// src/classify/mod.rs
//! Classifier: tags every raw item with a content category and a trust
//! score/tier.
//!
//! Both steps are keyword heuristics over the lowercased title + summary:
//! - category: distinct keyword hits per list, injury wins ties, minimum
//!   hit counts guard against single-word false positives;
//! - trust: starts from the feed's trust weight, optionally lifted by a known
//!   journalist, then adjusted by the first matching signal group
//!   (here-we-go → official → reliable → rumour).
//!
//! Pure: the same item and source always give the same result.

pub mod config;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ingest::types::RawItem;
use crate::sources::{FeedSource, SourceKind, SourceRegistry};
use crate::text::PhraseText;

pub use config::{ClassifierConfig, Journalist, TierBands};

/// Trust weight assumed for items whose feed is missing from the registry.
pub const UNKNOWN_SOURCE_WEIGHT: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Request scope only; never produced by detection.
    All,
    General,
    Transfer,
    Injury,
    Match,
}

impl Category {
    pub const DETECTED: [Category; 4] = [
        Category::General,
        Category::Transfer,
        Category::Injury,
        Category::Match,
    ];

    pub const ALL_SCOPES: [Category; 5] = [
        Category::All,
        Category::General,
        Category::Transfer,
        Category::Injury,
        Category::Match,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::General => "general",
            Category::Transfer => "transfer",
            Category::Injury => "injury",
            Category::Match => "match",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Category::All),
            "general" | "news" => Ok(Category::General),
            "transfer" | "transfers" => Ok(Category::Transfer),
            "injury" | "injuries" => Ok(Category::Injury),
            "match" | "matches" => Ok(Category::Match),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Coarse confidence bucket. Declared weakest first so `Ord` ranks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustTier {
    Unreliable,
    Reliable,
    Verified,
    TierOne,
    Official,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    #[serde(flatten)]
    pub raw: RawItem,
    pub category: Category,
    pub trust_score: u8,
    pub trust_tier: TrustTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_journalist: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    cfg: ClassifierConfig,
}

impl Classifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    pub fn classify(&self, raw: RawItem, source: &FeedSource) -> ClassifiedItem {
        self.classify_with(raw, source.trust_weight, source.kind)
    }

    /// Classify against an explicit trust weight and source kind.
    pub fn classify_with(&self, raw: RawItem, trust_weight: u8, kind: SourceKind) -> ClassifiedItem {
        let text = PhraseText::new(&format!(
            "{} {}",
            raw.title,
            raw.summary.as_deref().unwrap_or_default()
        ));
        let category = self.detect_category(&text);
        let (trust_score, trust_tier, matched_journalist) = self.score_trust(&text, trust_weight, kind);

        ClassifiedItem {
            raw,
            category,
            trust_score,
            trust_tier,
            matched_journalist,
        }
    }

    /// Classify a fetched batch, looking each item's feed up in `registry`.
    pub fn classify_batch(&self, items: Vec<RawItem>, registry: &SourceRegistry) -> Vec<ClassifiedItem> {
        items
            .into_iter()
            .map(|raw| match registry.get(&raw.source_id) {
                Some(src) => self.classify(raw, src),
                None => {
                    tracing::debug!(
                        target: "classify",
                        source = %raw.source_id,
                        "item from unregistered source, using default weight"
                    );
                    self.classify_with(raw, UNKNOWN_SOURCE_WEIGHT, SourceKind::Aggregator)
                }
            })
            .collect()
    }

    fn detect_category(&self, text: &PhraseText) -> Category {
        let c = &self.cfg;
        let transfer = text.count_matches(&c.transfer_keywords);
        let injury = text.count_matches(&c.injury_keywords);
        let matches = text.count_matches(&c.match_keywords);
        let general = text.count_matches(&c.general_keywords);

        // Injury terms are rare false positives: one hit is enough and ties go to injury.
        if injury >= c.min_injury_matches.max(1) && injury >= transfer && injury >= matches {
            return Category::Injury;
        }

        let ranked = [
            (Category::Transfer, transfer, c.min_transfer_matches),
            (Category::Match, matches, c.min_match_matches),
            (Category::General, general, c.min_general_matches),
        ];
        let best = ranked.iter().map(|(_, n, _)| *n).max().unwrap_or(0);
        let mut leaders = ranked.iter().filter(|(_, n, _)| *n == best);
        match (leaders.next(), leaders.next()) {
            (Some((cat, n, min)), None) if *n >= (*min).max(1) => *cat,
            _ => Category::General,
        }
    }

    fn tier_for(&self, score: u8, kind: SourceKind) -> TrustTier {
        let b = &self.cfg.tier_bands;
        if score >= b.official && kind == SourceKind::Official {
            TrustTier::Official
        } else if score >= b.tier_one {
            TrustTier::TierOne
        } else if score >= b.verified {
            TrustTier::Verified
        } else if score >= b.reliable {
            TrustTier::Reliable
        } else {
            TrustTier::Unreliable
        }
    }

    fn score_trust(
        &self,
        text: &PhraseText,
        trust_weight: u8,
        kind: SourceKind,
    ) -> (u8, TrustTier, Option<String>) {
        let c = &self.cfg;
        let mut score = i32::from(trust_weight.min(100));
        let mut tier = self.tier_for(score as u8, kind);

        let journalist = c.journalists.iter().find(|j| text.contains(&j.name));
        if let Some(j) = journalist {
            score = score.max(i32::from(j.score));
            tier = tier.max(j.tier);
        }

        if text.first_match(&c.here_we_go_phrases).is_some() {
            score = i32::from(c.here_we_go_score);
            tier = TrustTier::Official;
        } else if text.first_match(&c.official_phrases).is_some() {
            score = (score + c.official_boost).max(i32::from(c.official_floor));
            tier = TrustTier::Official;
        } else if text.first_match(&c.reliable_phrases).is_some() {
            score += c.reliable_boost;
            tier = tier.max(TrustTier::TierOne);
        } else if text.first_match(&c.rumour_phrases).is_some() {
            let floor = i32::from(c.rumour_floor).min(score);
            score = (score - c.rumour_penalty).max(floor);
            tier = TrustTier::Unreliable;
        }

        (
            score.clamp(0, 100) as u8,
            tier,
            journalist.map(|j| j.name.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn raw(title: &str, summary: Option<&str>) -> RawItem {
        RawItem {
            id: "x".into(),
            source_id: "test".into(),
            source_name: "Test".into(),
            title: title.into(),
            summary: summary.map(str::to_string),
            link: "https://example.test/a".into(),
            published_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
            image_url: None,
        }
    }

    fn classify(title: &str, summary: Option<&str>, weight: u8) -> ClassifiedItem {
        Classifier::default().classify_with(raw(title, summary), weight, SourceKind::Tier1Media)
    }

    #[test]
    fn transfer_needs_two_keywords() {
        assert_eq!(
            classify("Striker signs new contract", None, 80).category,
            Category::Transfer
        );
        assert_eq!(classify("Club prepares bid", None, 80).category, Category::General);
    }

    #[test]
    fn single_injury_keyword_wins_ties() {
        let it = classify("Midfielder suffers hamstring problem before match", None, 80);
        assert_eq!(it.category, Category::Injury);
    }

    #[test]
    fn match_report_detected() {
        let it = classify("Late penalty seals victory as Leeds beat Derby", None, 80);
        assert_eq!(it.category, Category::Match);
    }

    #[test]
    fn tie_between_transfer_and_match_falls_back_to_general() {
        let it = classify("Transfer deal done after the match penalty drama", None, 80);
        assert_eq!(it.category, Category::General);
    }

    #[test]
    fn base_tiers_follow_bands() {
        assert_eq!(classify("Weekend round-up", None, 90).trust_tier, TrustTier::TierOne);
        assert_eq!(classify("Weekend round-up", None, 72).trust_tier, TrustTier::Verified);
        assert_eq!(classify("Weekend round-up", None, 55).trust_tier, TrustTier::Reliable);
        assert_eq!(classify("Weekend round-up", None, 20).trust_tier, TrustTier::Unreliable);
        // only official feeds start in the official tier
        assert_eq!(classify("Weekend round-up", None, 99).trust_tier, TrustTier::TierOne);
    }

    #[test]
    fn here_we_go_forces_official_95() {
        for weight in [10, 60, 100] {
            let it = classify("Here we go! Club confirms signing", None, weight);
            assert_eq!(it.trust_tier, TrustTier::Official);
            assert_eq!(it.trust_score, 95);
        }
    }

    #[test]
    fn official_phrase_boosts_toward_top() {
        let it = classify("Club announces new captain", None, 60);
        assert_eq!(it.trust_tier, TrustTier::Official);
        assert_eq!(it.trust_score, 95);
        let it = classify("Club announces new captain", None, 90);
        assert_eq!(it.trust_score, 100);
    }

    #[test]
    fn reliable_phrase_lifts_to_tier_one() {
        let it = classify("Arsenal close to agreement for winger", None, 60);
        assert_eq!(it.trust_score, 70);
        assert_eq!(it.trust_tier, TrustTier::TierOne);
    }

    #[test]
    fn rumour_phrase_penalises_with_floor() {
        let it = classify("Speculation grows over striker future", None, 60);
        assert_eq!(it.trust_score, 40);
        assert_eq!(it.trust_tier, TrustTier::Unreliable);

        let it = classify("Speculation grows over striker future", None, 40);
        assert_eq!(it.trust_score, 30);

        // never raised by the floor
        let it = classify("Speculation grows over striker future", None, 10);
        assert_eq!(it.trust_score, 10);
    }

    #[test]
    fn journalist_lifts_score_and_is_recorded() {
        let it = classify("Fabrizio Romano: talks ongoing for midfielder", None, 50);
        assert_eq!(it.matched_journalist.as_deref(), Some("Fabrizio Romano"));
        assert_eq!(it.trust_score, 92);
        assert_eq!(it.trust_tier, TrustTier::TierOne);
    }

    #[test]
    fn category_parses_from_query_strings() {
        assert_eq!("Transfers".parse::<Category>().unwrap(), Category::Transfer);
        assert_eq!("".parse::<Category>().unwrap(), Category::All);
        assert!("cricket".parse::<Category>().is_err());
    }
}
