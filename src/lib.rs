// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod qa;
pub mod split;
pub mod utils;

pub use config::{Config, DatabaseConfig, ExtractionConfig, ModelConfig, SplitterConfig};
pub use error::{PipelineError, Result};
pub use extract::{ExtractOutcome, ExtractStatus, extract_documents};
pub use index::{LanceDbStore, OllamaEmbeddingClient};
pub use models::{Chunk, DocType, Document, DocumentMetadata, Priority, SearchResult, Table};
pub use pipeline::{BuildReport, IndexBuilder, PipelineStats, ProgressTracker};
pub use qa::{AnswerEngine, MultiQueryRetriever, OllamaGenerationClient};
pub use split::ChunkSplitter;
pub use utils::Validator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _splitter = ChunkSplitter::new(&config.splitter);
    }
}
