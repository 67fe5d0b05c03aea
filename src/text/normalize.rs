//! Query tokenization and normalization
//!
//! Queries are stripped of punctuation, lowercased, split on whitespace,
//! and filtered against two fixed word lists before scoring. Only ASCII
//! word characters survive the strip; everything else, non-latin letters
//! included, is removed. Token order and duplicates are preserved.

use crate::error::{KbChatError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Discourse fillers dropped before matching.
const FILLER_WORDS: &[&str] = &[
    "um", "like", "you", "know", "so", "well", "actually", "basically", "just", "really",
];

/// Stop words dropped before matching.
///
/// The list is part of the matching contract and is kept exactly as shipped,
/// duplicate and cased entries included. Entries that can never match a
/// lowercased single token ("Team", "Verdict", "T", the multi-word phrases)
/// are inert but retained.
const STOP_WORDS: &[&str] = &[
    "is",
    "are",
    "was",
    "were",
    "what",
    "who",
    "how",
    "where",
    "when",
    "why",
    "i",
    "me",
    "you",
    "his",
    "her",
    "ok",
    "bye",
    "i am sorry",
    "it is what it is",
    "it",
    "is",
    "on",
    "over",
    "under",
    "inside",
    "an",
    "a",
    "the",
    "does",
    "con",
    "get",
    "got",
    "have",
    "had",
    "has",
    "should",
    "not",
    "use",
    "mobile",
    "team",
    "Team",
    "Verdict",
    "an",
    "no",
    "not",
    "but",
    "T",
    "15",
    "with",
];

fn filler_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| FILLER_WORDS.iter().copied().collect())
}

fn stop_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Normalizes raw queries into the token sequence the ranker scores with.
pub struct Normalizer {
    strip_regex: Regex,
}

impl Normalizer {
    /// Create a normalizer with its strip pattern compiled.
    pub fn new() -> Result<Self> {
        let strip_regex = Regex::new(r"[^[:word:][:space:]]").map_err(|e| {
            KbChatError::TextProcessing(format!("Failed to compile strip regex: {}", e))
        })?;

        Ok(Self { strip_regex })
    }

    /// Tokenize a query: strip punctuation, lowercase, split on whitespace
    /// runs, drop filler and stop words.
    pub fn tokenize(&self, query: &str) -> Vec<String> {
        let cleaned = self.strip_regex.replace_all(query, "");
        cleaned
            .to_lowercase()
            .split_whitespace()
            .filter(|word| !filler_set().contains(*word) && !stop_set().contains(*word))
            .map(|word| word.to_string())
            .collect()
    }
}
