// src/dedup/similarity.rs
//! Pairwise "same story" predicate.
//!
//! Order of checks:
//! 1. publish times more than `max_time_gap_secs` apart → different stories;
//! 2. title similarity ≥ `title_threshold` → same story;
//! 3. keyword overlap > `keyword_overlap_threshold` with title similarity
//!    above `keyword_title_floor` → same story;
//! 4. two transfer items naming the same player → same story.
//!
//! Every check is symmetric in its arguments.

use std::collections::HashSet;

use crate::classify::{Category, ClassifiedItem};
use crate::dedup::DedupConfig;
use crate::text::{jaccard, match_form, token_set, tokens};

/// Words too common in football copy to count as shared keywords.
const KEYWORD_STOPWORDS: &[&str] = &[
    "about", "after", "again", "against", "ahead", "also", "amid", "before", "being", "could",
    "from", "have", "into", "more", "news", "over", "says", "said", "than", "that", "their",
    "them", "then", "there", "they", "this", "today", "told", "under", "until", "what", "when",
    "where", "which", "while", "will", "with", "would", "your", "club", "football", "season",
    "team", "player", "players",
];

/// Per-item features computed once per clustering pass.
#[derive(Debug, Clone)]
pub struct Features {
    title_tokens: HashSet<String>,
    title_form: String,
    keywords: HashSet<String>,
    player: Option<String>,
}

impl Features {
    pub fn of(item: &ClassifiedItem, cfg: &DedupConfig) -> Self {
        let raw = &item.raw;
        let body = format!("{} {}", raw.title, raw.summary.as_deref().unwrap_or_default());
        Self {
            title_tokens: token_set(&raw.title),
            title_form: match_form(&raw.title),
            keywords: keywords(&body, cfg.min_keyword_chars),
            player: candidate_player_name(&raw.title, &cfg.name_stop_tokens),
        }
    }
}

/// Jaccard over title tokens, optionally averaged with normalized
/// Levenshtein on the punctuation-stripped titles.
pub fn title_similarity(a: &str, b: &str, blend_edit_distance: bool) -> f64 {
    similarity_of(&token_set(a), &token_set(b), &match_form(a), &match_form(b), blend_edit_distance)
}

fn similarity_of(
    ta: &HashSet<String>,
    tb: &HashSet<String>,
    fa: &str,
    fb: &str,
    blend: bool,
) -> f64 {
    let j = jaccard(ta, tb);
    if !blend || fa.is_empty() || fb.is_empty() {
        return j;
    }
    (j + strsim::normalized_levenshtein(fa, fb)) / 2.0
}

/// Distinct content words of at least `min_chars` characters.
pub fn keywords(text: &str, min_chars: usize) -> HashSet<String> {
    tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() >= min_chars)
        .filter(|t| !KEYWORD_STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// |A ∩ B| / min(|A|, |B|); 0.0 when either side is empty.
pub fn keyword_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / smaller as f64
}

/// First pair of adjacent capitalised words in a headline that are not club
/// names or headline filler, e.g. "Marco Silva" in
/// "Brighton complete Marco Silva move".
pub fn candidate_player_name<S: AsRef<str>>(title: &str, stop_tokens: &[S]) -> Option<String> {
    let is_stop = |w: &str| stop_tokens.iter().any(|s| s.as_ref().eq_ignore_ascii_case(w));

    let mut prev: Option<&str> = None;
    for raw_word in title.split_whitespace() {
        let word = raw_word.trim_matches(|c: char| !c.is_alphanumeric());
        let candidate = is_name_word(word) && !is_stop(word);
        if candidate {
            if let Some(first) = prev {
                return Some(format!("{first} {word}"));
            }
        }
        // Punctuation after a word ("Silva:", "Silva,") ends the bigram.
        let clause_break = raw_word
            .chars()
            .last()
            .is_some_and(|c| matches!(c, ':' | ',' | ';' | '.' | '!' | '?' | '|'));
        prev = if candidate && !clause_break { Some(word) } else { None };
    }
    None
}

fn is_name_word(w: &str) -> bool {
    let mut chars = w.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    // acronyms (PSG, BREAKING) are not names
    first.is_uppercase()
        && w.chars().count() >= 2
        && w.chars().any(|c| c.is_lowercase())
        && w.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-')
}

/// Predicate over precomputed features.
pub fn similar_with(
    a: &ClassifiedItem,
    fa: &Features,
    b: &ClassifiedItem,
    fb: &Features,
    cfg: &DedupConfig,
) -> bool {
    let gap = (a.raw.published_at - b.raw.published_at).num_seconds().abs();
    if gap > cfg.max_time_gap_secs {
        return false;
    }

    let title_sim = similarity_of(
        &fa.title_tokens,
        &fb.title_tokens,
        &fa.title_form,
        &fb.title_form,
        cfg.blend_edit_distance,
    );
    if title_sim >= cfg.title_threshold {
        return true;
    }

    if keyword_overlap(&fa.keywords, &fb.keywords) > cfg.keyword_overlap_threshold
        && title_sim > cfg.keyword_title_floor
    {
        return true;
    }

    if a.category == Category::Transfer && b.category == Category::Transfer {
        if let (Some(pa), Some(pb)) = (&fa.player, &fb.player) {
            return pa.eq_ignore_ascii_case(pb);
        }
    }

    false
}

/// Whether `a` and `b` report the same story.
pub fn is_similar(a: &ClassifiedItem, b: &ClassifiedItem, cfg: &DedupConfig) -> bool {
    similar_with(a, &Features::of(a, cfg), b, &Features::of(b, cfg), cfg)
}
