// file: src/classify.rs
// description: lexical retrieval-priority classification for chunks
// reference: keyword-based document classification

use crate::models::{Chunk, Priority};

const CRITICAL_TERMS: [&str; 6] = [
    "total records:",
    "total amount:",
    "financial summary",
    "total:",
    "sum:",
    "breakdown",
];

const HIGH_TERMS: [&str; 4] = ["calculation:", "average:", "count:", "distribution"];

const MEDIUM_TERMS: [&str; 3] = ["record", "row", "data"];

/// Map chunk text to a retrieval priority. Case-insensitive, first matching
/// tier wins: financial totals outrank generic record-ish language even when
/// both appear in the same chunk.
pub fn classify_priority(text: &str) -> Priority {
    let content = text.to_lowercase();

    if CRITICAL_TERMS.iter().any(|t| content.contains(t)) {
        Priority::Critical
    } else if HIGH_TERMS.iter().any(|t| content.contains(t)) {
        Priority::High
    } else if MEDIUM_TERMS.iter().any(|t| content.contains(t)) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Annotate a chunk in place with its priority and the matching content flag.
/// Low priority sets no flag.
pub fn annotate_chunk(chunk: &mut Chunk) {
    let priority = classify_priority(&chunk.text);
    chunk.priority = priority;
    match priority {
        Priority::Critical => chunk.contains_totals = true,
        Priority::High => chunk.contains_calculations = true,
        Priority::Medium => chunk.contains_records = true,
        Priority::Low => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{DocType, DocumentMetadata};

    fn chunk_for(text: &str) -> Chunk {
        let meta = DocumentMetadata::new("test.csv", DocType::CsvComplete);
        Chunk::new(text.to_string(), meta, 0)
    }

    #[test]
    fn test_critical_terms() {
        assert_eq!(classify_priority("TOTAL AMOUNT: $500"), Priority::Critical);
        assert_eq!(classify_priority("=== FINANCIAL SUMMARY ==="), Priority::Critical);
        assert_eq!(classify_priority("regional breakdown"), Priority::Critical);
    }

    #[test]
    fn test_high_terms() {
        assert_eq!(classify_priority("Average: 12.5"), Priority::High);
        assert_eq!(classify_priority("value distribution"), Priority::High);
    }

    #[test]
    fn test_medium_terms() {
        assert_eq!(classify_priority("Row 1: a:1"), Priority::Medium);
        assert_eq!(classify_priority("raw data dump"), Priority::Medium);
    }

    #[test]
    fn test_low_fallback() {
        assert_eq!(classify_priority("nothing interesting here"), Priority::Low);
    }

    #[test]
    fn test_critical_outranks_medium() {
        // "total:" plus "row" in the same chunk must still be critical
        assert_eq!(
            classify_priority("Row 5: amount:3 | Total: 1500"),
            Priority::Critical
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify_priority("ToTaL: 99"), Priority::Critical);
    }

    #[test]
    fn test_annotate_sets_single_flag() {
        let mut chunk = chunk_for("TOTAL: 100 and some rows");
        annotate_chunk(&mut chunk);
        assert_eq!(chunk.priority, Priority::Critical);
        assert!(chunk.contains_totals);
        assert!(!chunk.contains_calculations);
        assert!(!chunk.contains_records);

        let mut chunk = chunk_for("plain prose");
        annotate_chunk(&mut chunk);
        assert_eq!(chunk.priority, Priority::Low);
        assert!(!chunk.contains_totals);
        assert!(!chunk.contains_records);
    }
}
