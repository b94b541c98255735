// file: src/models/search_result.rs
// description: Search result model with similarity scores
// reference: Used for vector similarity search results

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Chunk row id (uuid assigned at index build)
    pub id: String,

    /// Originating filename
    pub source: String,

    /// Document type label (csv_complete, excel_chunk, table, ...)
    pub doc_type: String,

    /// Chunk text
    pub text: String,

    /// Classifier priority label
    pub priority: String,

    /// Chunk sequence position within the build
    pub chunk_id: u64,

    /// Similarity score (higher is more similar, typically 0.0-1.0)
    pub score: f32,

    /// Optional: Distance metric (lower is more similar)
    pub distance: Option<f32>,
}

impl SearchResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        source: String,
        doc_type: String,
        text: String,
        priority: String,
        chunk_id: u64,
        score: f32,
        distance: Option<f32>,
    ) -> Self {
        Self {
            id,
            source,
            doc_type,
            text,
            priority,
            chunk_id,
            score,
            distance,
        }
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let preview: String = self.text.chars().take(max_content_len).collect();
        let preview = if self.text.chars().count() > max_content_len {
            format!("{preview}...")
        } else {
            preview
        };

        format!(
            "Score: {:.4} | {} [{}] priority={}\n{}\n",
            self.score, self.source, self.doc_type, self.priority, preview
        )
    }
}
