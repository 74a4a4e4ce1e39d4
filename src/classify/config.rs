// src/classify/config.rs
//! Tunable keyword lists and trust adjustments for the classifier.
//!
//! Every list and number can be overridden from the `[classifier]` table of
//! `config/news.toml`; omitted fields keep the defaults below.

use serde::{Deserialize, Serialize};

use crate::classify::TrustTier;

pub const MIN_TRANSFER_MATCHES: usize = 2;
pub const MIN_MATCH_MATCHES: usize = 2;
pub const MIN_INJURY_MATCHES: usize = 1;
pub const MIN_GENERAL_MATCHES: usize = 1;

pub const HERE_WE_GO_SCORE: u8 = 95;
pub const OFFICIAL_BOOST: i32 = 15;
pub const OFFICIAL_FLOOR: u8 = 95;
pub const RELIABLE_BOOST: i32 = 10;
pub const RUMOUR_PENALTY: i32 = 20;
pub const RUMOUR_FLOOR: u8 = 30;

/// Journalist whose by-line lifts an item to at least `score` / `tier`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Journalist {
    pub name: String,
    pub score: u8,
    pub tier: TrustTier,
}

/// Score bands used to derive a tier from a bare trust score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierBands {
    pub official: u8,
    pub tier_one: u8,
    pub verified: u8,
    pub reliable: u8,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            official: 95,
            tier_one: 85,
            verified: 70,
            reliable: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub transfer_keywords: Vec<String>,
    pub injury_keywords: Vec<String>,
    pub match_keywords: Vec<String>,
    pub general_keywords: Vec<String>,

    pub min_transfer_matches: usize,
    pub min_match_matches: usize,
    pub min_injury_matches: usize,
    pub min_general_matches: usize,

    pub here_we_go_phrases: Vec<String>,
    pub official_phrases: Vec<String>,
    pub reliable_phrases: Vec<String>,
    pub rumour_phrases: Vec<String>,

    pub here_we_go_score: u8,
    pub official_boost: i32,
    pub official_floor: u8,
    pub reliable_boost: i32,
    pub rumour_penalty: i32,
    pub rumour_floor: u8,

    pub tier_bands: TierBands,
    pub journalists: Vec<Journalist>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            transfer_keywords: owned(&[
                "transfer",
                "transfers",
                "signs",
                "signing",
                "signed",
                "deal",
                "fee",
                "loan",
                "bid",
                "contract",
                "joins",
                "move",
                "medical",
                "here we go",
                "agreement",
                "target",
                "swap",
                "release clause",
                "free agent",
                "personal terms",
            ]),
            injury_keywords: owned(&[
                "injury",
                "injured",
                "injuries",
                "hamstring",
                "ankle",
                "knee",
                "groin",
                "sidelined",
                "ruled out",
                "surgery",
                "fitness doubt",
                "strain",
                "acl",
                "concussion",
                "out for",
                "setback",
                "rehabilitation",
            ]),
            match_keywords: owned(&[
                "match",
                "goal",
                "goals",
                "win",
                "wins",
                "defeat",
                "draw",
                "score",
                "scores",
                "kick off",
                "lineup",
                "line up",
                "fixture",
                "result",
                "highlights",
                "half time",
                "full time",
                "penalty",
                "victory",
                "beat",
                "beats",
                "clean sheet",
                "stoppage time",
            ]),
            general_keywords: owned(&[
                "press conference",
                "manager",
                "coach",
                "board",
                "stadium",
                "season preview",
                "ownership",
                "takeover",
                "academy",
                "interview",
            ]),

            min_transfer_matches: MIN_TRANSFER_MATCHES,
            min_match_matches: MIN_MATCH_MATCHES,
            min_injury_matches: MIN_INJURY_MATCHES,
            min_general_matches: MIN_GENERAL_MATCHES,

            here_we_go_phrases: owned(&["here we go"]),
            official_phrases: owned(&[
                "official",
                "officially",
                "confirmed",
                "confirms",
                "announced",
                "announces",
                "completes",
                "completed",
                "unveiled",
            ]),
            reliable_phrases: owned(&[
                "agreement reached",
                "close to",
                "advanced talks",
                "personal terms agreed",
                "medical scheduled",
                "verbal agreement",
                "set to sign",
            ]),
            rumour_phrases: owned(&[
                "rumour",
                "rumours",
                "rumor",
                "rumors",
                "speculation",
                "interested",
                "interest",
                "monitoring",
                "linked",
                "considering",
                "eyeing",
                "could",
                "reportedly",
            ]),

            here_we_go_score: HERE_WE_GO_SCORE,
            official_boost: OFFICIAL_BOOST,
            official_floor: OFFICIAL_FLOOR,
            reliable_boost: RELIABLE_BOOST,
            rumour_penalty: RUMOUR_PENALTY,
            rumour_floor: RUMOUR_FLOOR,

            tier_bands: TierBands::default(),
            journalists: vec![
                Journalist {
                    name: "Fabrizio Romano".into(),
                    score: 92,
                    tier: TrustTier::TierOne,
                },
                Journalist {
                    name: "David Ornstein".into(),
                    score: 92,
                    tier: TrustTier::TierOne,
                },
                Journalist {
                    name: "Gianluca Di Marzio".into(),
                    score: 85,
                    tier: TrustTier::Verified,
                },
                Journalist {
                    name: "Florian Plettenberg".into(),
                    score: 80,
                    tier: TrustTier::Verified,
                },
                Journalist {
                    name: "Matteo Moretto".into(),
                    score: 80,
                    tier: TrustTier::Verified,
                },
            ],
        }
    }
}
