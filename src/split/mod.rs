// file: src/split/mod.rs
// description: recursive separator-aware chunk splitting with overlap
// reference: recursive character splitting over a fixed separator priority list

use crate::classify::annotate_chunk;
use crate::config::SplitterConfig;
use crate::models::{Chunk, Document};

/// Separator boundaries in priority order. Structural markers from the
/// tabular renderer ("===", "TOTAL", ...) sit between paragraph/line breaks
/// and the list/table fallbacks so rendered sections split cleanly.
const SEPARATORS: [&str; 10] = [
    "\n\n", "\n", "===", "TOTAL", "SUMMARY", "BREAKDOWN", "---", "|", ",", " ",
];

pub struct ChunkSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkSplitter {
    pub fn new(config: &SplitterConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Split documents into classified chunks. Chunk ids are assigned across
    /// the whole build in document order then position order, starting at 0.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut next_id = 0usize;

        for document in documents {
            for piece in self.split_text(&document.content) {
                let mut chunk = Chunk::new(piece, document.metadata.clone(), next_id);
                annotate_chunk(&mut chunk);
                chunks.push(chunk);
                next_id += 1;
            }
        }

        chunks
    }

    /// Split one text into pieces of at most `chunk_size` characters,
    /// preferring the earliest separator in the priority list that applies.
    /// Separators are retained at the head of the piece they introduce so
    /// structural markers survive into chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let pieces = self.split_recursive(text, &SEPARATORS);
        self.merge_with_overlap(pieces)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((separator, rest)) = separators.split_first() else {
            return self.split_chars(text);
        };

        if !text.contains(separator) {
            return self.split_recursive(text, rest);
        }

        let mut pieces = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if piece.chars().count() > self.chunk_size {
                pieces.extend(self.split_recursive(&piece, rest));
            } else {
                pieces.push(piece);
            }
        }
        pieces
    }

    /// Greedily merge pieces into chunks under the size limit. A new chunk
    /// starts with a tail of the previous one, trimmed so the overlap never
    /// pushes the chunk over the limit.
    fn merge_with_overlap(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();

            if current_len > 0 && current_len + piece_len > self.chunk_size {
                let previous = std::mem::take(&mut current);

                let budget = self.chunk_size.saturating_sub(piece_len);
                let overlap = self.chunk_overlap.min(budget);
                current = tail_chars(&previous, overlap);
                current_len = current.chars().count();

                if !previous.trim().is_empty() {
                    chunks.push(previous);
                }
            }

            current.push_str(&piece);
            current_len += piece_len;
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Character-level fallback when no separator below the limit exists.
    fn split_chars(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size.max(1);
        chars
            .chunks(step)
            .map(|c| c.iter().collect())
            .collect()
    }
}

/// Split so every occurrence of the separator begins a new piece; the
/// separator itself is kept at the head of that piece.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0usize;

    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
            start = idx;
        }
    }
    pieces.push(text[start..].to_string());

    pieces
}

fn tail_chars(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(count);
    chars[start..].iter().collect()
}
