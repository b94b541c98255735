// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod chunk;
pub mod document;
pub mod search_result;
pub mod table;

pub use chunk::{Chunk, Priority};
pub use document::{DocType, Document, DocumentMetadata};
pub use search_result::SearchResult;
pub use table::Table;
