//! In-memory knowledgebase table
//!
//! The table is loaded once from a CSV source and never mutated afterwards;
//! a row's identity is its zero-based position for the process lifetime.

use crate::error::{KbChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One knowledgebase row. Every field is optional; empty CSV cells
/// deserialize to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KbRecord {
    /// Device/module identifier, the only column scored against query keywords.
    #[serde(rename = "ASIC/Module")]
    pub module: Option<String>,

    #[serde(rename = "Problem")]
    pub problem: Option<String>,

    #[serde(rename = "Solution")]
    pub solution: Option<String>,

    #[serde(rename = "Root cause")]
    pub root_cause: Option<String>,

    #[serde(rename = "Preventive action")]
    pub preventive_action: Option<String>,

    /// Lessons-learned / best-practice tag.
    #[serde(rename = "LL/BP")]
    pub classification: Option<String>,

    #[serde(rename = "Reference document folder")]
    pub reference: Option<String>,

    #[serde(rename = "Year")]
    pub year: Option<String>,

    #[serde(rename = "Project")]
    pub project: Option<String>,

    #[serde(rename = "Author")]
    pub author: Option<String>,
}

impl KbRecord {
    /// Answer fields in presentation order, paired with their column labels.
    pub fn answer_fields(&self) -> [(&'static str, Option<&str>); 9] {
        [
            ("Problem", self.problem.as_deref()),
            ("Solution", self.solution.as_deref()),
            ("Root cause", self.root_cause.as_deref()),
            ("Preventive action", self.preventive_action.as_deref()),
            ("LL/BP", self.classification.as_deref()),
            ("Reference document folder", self.reference.as_deref()),
            ("Year", self.year.as_deref()),
            ("Project", self.project.as_deref()),
            ("Author", self.author.as_deref()),
        ]
    }
}

/// Immutable knowledgebase table.
#[derive(Debug)]
pub struct KbTable {
    records: Vec<KbRecord>,
}

impl KbTable {
    /// Load the table from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(KbChatError::Config(format!(
                "Knowledgebase file not found: {}",
                path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: KbRecord = row?;
            records.push(record);
        }

        log::info!(
            "Knowledgebase loaded: {} rows from {}",
            records.len(),
            path.display()
        );

        Ok(Self { records })
    }

    /// Build a table from already-typed rows.
    pub fn from_records(records: Vec<KbRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[KbRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KbRecord> {
        self.records.get(index)
    }

    /// Summary counts for the chat loop's `stats` command.
    pub fn stats(&self) -> KbStats {
        let searchable_rows = self.records.iter().filter(|r| r.module.is_some()).count();
        let answer_cells = self
            .records
            .iter()
            .map(|r| r.answer_fields().iter().filter(|(_, v)| v.is_some()).count())
            .sum();

        KbStats {
            rows: self.records.len(),
            searchable_rows,
            answer_cells,
        }
    }
}

/// Knowledgebase summary statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbStats {
    /// Total number of rows
    pub rows: usize,

    /// Rows with a populated search column
    pub searchable_rows: usize,

    /// Populated answer cells across all rows
    pub answer_cells: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
ASIC/Module,Problem,Solution,Root cause,Preventive action,LL/BP,Reference document folder,Year,Project,Author
CFI flashing unit,Flash write aborts mid-sequence,Reflash with the release image,Loose harness contact,Pin the harness before flashing,LL,https://docs.example.com/cfi-flashing,2023,Orion,A. Mentor
Power module,Supply dips under load,Swap the regulator,,,BP,shared drive folder 12,2022,Vega,
,Orphan row without a module,,,,,,,,
";

    fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        path
    }

    #[test]
    fn test_load_typed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let table = KbTable::load(write_sample(&dir)).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap().module.as_deref(), Some("CFI flashing unit"));
        assert_eq!(table.get(0).unwrap().year.as_deref(), Some("2023"));
        // Empty cells come back as None, not empty strings.
        assert_eq!(table.get(1).unwrap().root_cause, None);
        assert_eq!(table.get(1).unwrap().author, None);
        assert_eq!(table.get(2).unwrap().module, None);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = KbTable::load("/nonexistent/kb.csv").unwrap_err();
        match err {
            KbChatError::Config(msg) => assert!(msg.contains("not found")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let table = KbTable::load(write_sample(&dir)).unwrap();
        let stats = table.stats();

        assert_eq!(stats.rows, 3);
        assert_eq!(stats.searchable_rows, 2);
        // Row 0 fills all 9 answer cells, row 1 fills 6, row 2 fills 1.
        assert_eq!(stats.answer_cells, 16);
    }

    #[test]
    fn test_answer_field_order() {
        let record = KbRecord {
            problem: Some("p".to_string()),
            author: Some("a".to_string()),
            ..Default::default()
        };
        let fields = record.answer_fields();
        assert_eq!(fields[0].0, "Problem");
        assert_eq!(fields[8].0, "Author");
        assert_eq!(fields[1].1, None);
    }
}
