//! Keyword ranking over the knowledgebase table
//!
//! Scoring is deliberately simple: a row's match score is the number of
//! query tokens that occur as a case-insensitive substring of its search
//! column. Scores are recomputed on every query; nothing is cached between
//! calls.

use crate::error::{KbChatError, Result};
use crate::kb::table::{KbRecord, KbTable};
use crate::text::Normalizer;
use regex::Regex;
use std::sync::Arc;

/// Fixed reply when no token matches any row.
pub const NO_MATCH_REPLY: &str = "Sorry, I don't understand.";

/// Best row for a query, by match score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch {
    /// Zero-based index of the first row achieving the maximum score.
    pub row: usize,

    /// Number of query tokens found in that row's search column.
    pub score: usize,

    /// Total number of scored tokens.
    pub token_count: usize,
}

/// Ranks knowledgebase rows against tokenized queries and formats answers.
pub struct KbSearch {
    table: Arc<KbTable>,
    normalizer: Normalizer,
    url_regex: Regex,
}

impl KbSearch {
    pub fn new(table: Arc<KbTable>) -> Result<Self> {
        let normalizer = Normalizer::new()?;
        let url_regex = Regex::new(r"^https?://").map_err(|e| {
            KbChatError::TextProcessing(format!("Failed to compile URL regex: {}", e))
        })?;

        Ok(Self {
            table,
            normalizer,
            url_regex,
        })
    }

    pub fn table(&self) -> &KbTable {
        &self.table
    }

    /// Score every row against the query and pick the best one. Ties break
    /// to the first row in table order, so ranking is deterministic.
    pub fn rank(&self, query: &str) -> Result<RankedMatch> {
        if self.table.is_empty() {
            return Err(KbChatError::EmptyTable);
        }

        let tokens = self.normalizer.tokenize(query);
        let mut best_row = 0usize;
        let mut best_score = 0usize;

        for (row, record) in self.table.records().iter().enumerate() {
            let score = match record.module.as_deref() {
                // A missing search value scores zero for every token.
                None => 0,
                Some(value) => {
                    let haystack = value.to_lowercase();
                    tokens
                        .iter()
                        .filter(|token| haystack.contains(token.as_str()))
                        .count()
                }
            };

            if score > best_score {
                best_score = score;
                best_row = row;
            }
        }

        log::debug!(
            "Best row {} scored {}/{} tokens",
            best_row,
            best_score,
            tokens.len()
        );

        Ok(RankedMatch {
            row: best_row,
            score: best_score,
            token_count: tokens.len(),
        })
    }

    /// Answer a query from the knowledgebase: the formatted best row, or the
    /// no-match sentinel when nothing overlaps.
    pub fn answer(&self, query: &str) -> Result<String> {
        let best = self.rank(query)?;
        if best.score == 0 {
            return Ok(NO_MATCH_REPLY.to_string());
        }

        match self.table.get(best.row) {
            Some(record) => Ok(self.format_record(record)),
            None => Err(KbChatError::Table(format!(
                "row {} out of bounds",
                best.row
            ))),
        }
    }

    /// Render populated answer columns in fixed order, one block per column,
    /// joined by blank lines. Reference values that look like URLs become
    /// clickable links.
    fn format_record(&self, record: &KbRecord) -> String {
        let mut blocks = Vec::new();
        for (label, value) in record.answer_fields() {
            let Some(value) = value else { continue };
            if label == "Reference document folder" && self.url_regex.is_match(value) {
                blocks.push(format!("**{}:** [Open Document]({})", label, value));
            } else {
                blocks.push(format!("**{}:**\n{}", label, value));
            }
        }
        blocks.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(module: Option<&str>, problem: Option<&str>) -> KbRecord {
        KbRecord {
            module: module.map(str::to_string),
            problem: problem.map(str::to_string),
            ..Default::default()
        }
    }

    fn search_over(records: Vec<KbRecord>) -> KbSearch {
        KbSearch::new(Arc::new(KbTable::from_records(records))).unwrap()
    }

    #[test]
    fn test_no_overlap_returns_sentinel() {
        let search = search_over(vec![record(Some("CFI flashing unit"), Some("p"))]);
        assert_eq!(search.answer("quantum weather").unwrap(), NO_MATCH_REPLY);
    }

    #[test]
    fn test_stop_word_only_query_returns_sentinel() {
        let search = search_over(vec![record(Some("the team is on it"), Some("p"))]);
        // Every token is filtered out, so nothing can match.
        assert_eq!(search.answer("is it on the team").unwrap(), NO_MATCH_REPLY);
    }

    #[test]
    fn test_ties_break_to_first_row() {
        let search = search_over(vec![
            record(Some("flashing unit A"), Some("first")),
            record(Some("flashing unit B"), Some("second")),
        ]);
        let best = search.rank("flashing unit").unwrap();
        assert_eq!(best.row, 0);
        assert_eq!(best.score, 2);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let search = search_over(vec![
            record(Some("CFI block"), None),
            record(Some("flashing tool"), None),
        ]);
        let first = search.rank("cfi flashing issue").unwrap();
        let second = search.rank("cfi flashing issue").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_tokens_amplify_score() {
        let search = search_over(vec![
            record(Some("CFI block"), Some("first")),
            record(Some("flashing tool"), Some("second")),
        ]);
        // "flashing" counts twice, outweighing the single "cfi" hit.
        let best = search.rank("flashing flashing cfi").unwrap();
        assert_eq!(best.row, 1);
        assert_eq!(best.score, 2);
    }

    #[test]
    fn test_score_bounded_by_token_count() {
        let search = search_over(vec![record(Some("cfi cfi cfi flashing"), None)]);
        let best = search.rank("cfi flashing").unwrap();
        assert!(best.score <= best.token_count);
        assert_eq!(best.score, 2);
    }

    #[test]
    fn test_missing_search_value_scores_zero() {
        let search = search_over(vec![
            record(None, Some("orphan")),
            record(Some("flashing tool"), Some("match")),
        ]);
        let best = search.rank("flashing").unwrap();
        assert_eq!(best.row, 1);
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let search = search_over(vec![]);
        match search.rank("flashing") {
            Err(KbChatError::EmptyTable) => (),
            other => panic!("Expected EmptyTable, got {:?}", other),
        }
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let search = search_over(vec![record(Some("CFI Flashing Unit"), Some("p"))]);
        let best = search.rank("cfi").unwrap();
        assert_eq!(best.score, 1);
    }

    #[test]
    fn test_answer_formatting_with_link() {
        let search = search_over(vec![KbRecord {
            module: Some("CFI flashing unit".to_string()),
            problem: Some("Flash write aborts".to_string()),
            solution: Some("Reflash with the release image".to_string()),
            reference: Some("https://docs.example.com/cfi".to_string()),
            ..Default::default()
        }]);

        let answer = search.answer("flashing").unwrap();
        assert_eq!(
            answer,
            "**Problem:**\nFlash write aborts\n\n\
             **Solution:**\nReflash with the release image\n\n\
             **Reference document folder:** [Open Document](https://docs.example.com/cfi)"
        );
    }

    #[test]
    fn test_answer_formatting_with_plain_reference() {
        let search = search_over(vec![KbRecord {
            module: Some("Power module".to_string()),
            reference: Some("shared drive folder 12".to_string()),
            ..Default::default()
        }]);

        let answer = search.answer("power").unwrap();
        assert_eq!(
            answer,
            "**Reference document folder:**\nshared drive folder 12"
        );
    }

    #[test]
    fn test_all_empty_answer_row_yields_empty_string() {
        let search = search_over(vec![record(Some("flashing tool"), None)]);
        assert_eq!(search.answer("flashing").unwrap(), "");
    }
}
