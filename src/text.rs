// src/text.rs
//! Matching helpers shared by the classifier and the deduplicator.
//!
//! Everything here works on a "match form" of the text: lowercase, every
//! non-alphanumeric character replaced by a space, whitespace collapsed.
//! Phrase lookups pad with spaces so "win" never matches inside "window".

use std::collections::HashSet;

/// Lowercase, punctuation-stripped, single-spaced form of `s`.
pub fn match_form(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            for lc in ch.to_lowercase() {
                out.push(lc);
            }
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Tokens of the match form.
pub fn tokens(s: &str) -> Vec<String> {
    match_form(s)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn token_set(s: &str) -> HashSet<String> {
    tokens(s).into_iter().collect()
}

/// Text prepared once for repeated phrase lookups.
#[derive(Debug, Clone)]
pub struct PhraseText {
    padded: String,
}

impl PhraseText {
    pub fn new(s: &str) -> Self {
        Self {
            padded: format!(" {} ", match_form(s)),
        }
    }

    /// Whole-word (or whole-phrase) containment.
    pub fn contains(&self, phrase: &str) -> bool {
        let p = match_form(phrase);
        if p.is_empty() {
            return false;
        }
        self.padded.contains(&format!(" {p} "))
    }

    /// Number of distinct phrases from `list` present in the text.
    pub fn count_matches<S: AsRef<str>>(&self, list: &[S]) -> usize {
        list.iter().filter(|p| self.contains(p.as_ref())).count()
    }

    pub fn first_match<'a, S: AsRef<str>>(&self, list: &'a [S]) -> Option<&'a str> {
        list.iter()
            .map(AsRef::as_ref)
            .find(|p| self.contains(p))
    }
}

/// Jaccard index of two sets; 0.0 when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_form_strips_punctuation_and_case() {
        assert_eq!(match_form("  Here we go!  Club CONFIRMS signing. "), "here we go club confirms signing");
        assert_eq!(match_form("kick-off"), "kick off");
        assert_eq!(match_form("!!!"), "");
    }

    #[test]
    fn phrases_match_on_word_boundaries() {
        let t = PhraseText::new("Transfer window: winger close to a deal");
        assert!(t.contains("close to"));
        assert!(t.contains("Deal"));
        assert!(!t.contains("win"));
        assert_eq!(t.count_matches(&["deal", "window", "win", "loan"]), 2);
    }

    #[test]
    fn jaccard_of_empty_sets_is_zero() {
        let a = token_set("");
        let b = token_set("something");
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&b, &b), 1.0);
    }
}
