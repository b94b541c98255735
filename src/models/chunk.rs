// file: src/models/chunk.rs
// description: indexed chunk model with retrieval priority annotations
// reference: internal data structures

use crate::models::document::DocumentMetadata;
use serde::{Deserialize, Serialize};

/// Retrieval priority assigned by the lexical classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded-size fragment of a document, the unit of indexing and retrieval.
/// Created once per build and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: DocumentMetadata,
    /// Sequence position, unique and strictly increasing within a build.
    pub chunk_id: usize,
    /// Character count of `text`.
    pub chunk_size: usize,
    pub priority: Priority,
    pub contains_totals: bool,
    pub contains_calculations: bool,
    pub contains_records: bool,
}

impl Chunk {
    pub fn new(text: String, metadata: DocumentMetadata, chunk_id: usize) -> Self {
        let chunk_size = text.chars().count();
        Self {
            text,
            metadata,
            chunk_id,
            chunk_size,
            priority: Priority::Low,
            contains_totals: false,
            contains_calculations: false,
            contains_records: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{DocType, DocumentMetadata};

    #[test]
    fn test_chunk_size_is_char_count() {
        let meta = DocumentMetadata::new("a.csv", DocType::CsvComplete);
        let chunk = Chunk::new("Résumé".to_string(), meta, 0);
        assert_eq!(chunk.chunk_size, 6);
        assert_eq!(chunk.priority, Priority::Low);
    }

    #[test]
    fn test_priority_round_trip() {
        for p in [
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
        assert_eq!(Priority::parse("urgent"), None);
    }
}
