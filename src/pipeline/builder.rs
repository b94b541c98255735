// file: src/pipeline/builder.rs
// description: end-to-end index build (extract, split, embed, store)
// reference: pipeline orchestration over the extract/split/index layers

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::extract::{ExtractStatus, extract_documents};
use crate::index::{LanceDbStore, OllamaEmbeddingClient};
use crate::pipeline::progress::ProgressTracker;
use crate::split::ChunkSplitter;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Summary of one index build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub source: String,
    pub content_hash: String,
    /// True when the stored build already matched the file bytes.
    pub skipped: bool,
    /// True when extraction fell back to a placeholder or OCR path.
    pub degraded: bool,
    pub documents_extracted: usize,
    pub chunks_indexed: usize,
    pub doc_type_counts: HashMap<String, usize>,
    pub duration_secs: u64,
}

pub struct IndexBuilder<'a> {
    config: &'a Config,
    store: &'a LanceDbStore,
    embedder: &'a OllamaEmbeddingClient,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(config: &'a Config, store: &'a LanceDbStore, embedder: &'a OllamaEmbeddingClient) -> Self {
        Self {
            config,
            store,
            embedder,
        }
    }

    /// Build the index from one file, replacing any previous build. When the
    /// file bytes hash to the same value as the stored build, the rebuild is
    /// skipped unless `force` is set.
    pub async fn build_from_file(&self, path: &Path, force: bool) -> Result<BuildReport> {
        let start = Instant::now();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PipelineError::Validation(format!("invalid file path: {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::FileOperation {
                path: path.to_path_buf(),
                source: e,
            })?;

        let max_bytes = self.config.extraction.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() > max_bytes {
            return Err(PipelineError::Validation(format!(
                "{filename} is {} bytes, over the {} MB limit",
                bytes.len(),
                self.config.extraction.max_file_size_mb
            )));
        }

        let content_hash = hash_bytes(&bytes);

        if !force && self.store.latest_content_hash().await?.as_deref() == Some(&content_hash) {
            info!("{filename} already indexed (hash {content_hash}), skipping rebuild");
            return Ok(BuildReport {
                source: filename,
                content_hash,
                skipped: true,
                degraded: false,
                documents_extracted: 0,
                chunks_indexed: self.store.chunk_count().await? as usize,
                doc_type_counts: HashMap::new(),
                duration_secs: start.elapsed().as_secs(),
            });
        }

        // extraction is CPU and file-format bound, keep it off the runtime
        let extraction_config = self.config.extraction.clone();
        let extract_filename = filename.clone();
        let byte_count = bytes.len() as u64;
        let outcome = tokio::task::spawn_blocking(move || {
            extract_documents(&bytes, &extract_filename, &extraction_config)
        })
        .await
        .map_err(|e| PipelineError::Extraction {
            source_file: filename.clone(),
            message: format!("extraction task panicked: {e}"),
        })?;

        let degraded = outcome.is_degraded();
        if outcome.status == ExtractStatus::Failed {
            warn!("{filename} extraction failed, indexing the error placeholder");
        }

        let splitter = ChunkSplitter::new(&self.config.splitter);
        let chunks = splitter.split_documents(&outcome.documents);

        info!(
            "{filename}: {} documents, {} chunks",
            outcome.documents.len(),
            chunks.len()
        );

        let tracker = ProgressTracker::new(chunks.len());
        tracker.add_bytes_processed(byte_count);
        for _ in &outcome.documents {
            tracker.add_document();
        }

        let mut embeddings = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            embeddings.push(self.embedder.embed(&chunk.text).await);
            tracker.inc_chunk_embedded();
        }
        tracker.finish();

        self.store.rebuild(&chunks, embeddings, &content_hash).await?;

        let mut doc_type_counts = HashMap::new();
        for chunk in &chunks {
            *doc_type_counts
                .entry(chunk.metadata.doc_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        Ok(BuildReport {
            source: filename,
            content_hash,
            skipped: false,
            degraded,
            documents_extracted: outcome.documents.len(),
            chunks_indexed: chunks.len(),
            doc_type_counts,
            duration_secs: start.elapsed().as_secs(),
        })
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Write;

    fn test_config(dir: &Path) -> Config {
        let mut config = Config::default_config();
        config.database.uri = dir.join("lancedb").display().to_string();
        config.database.embedding_dim = 16;
        config.model.base_url = "http://127.0.0.1:1".to_string();
        config
    }

    #[test]
    fn test_hash_bytes_is_sha256_hex() {
        let hash = hash_bytes(b"hello");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_build_then_skip_then_force() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let csv_path = dir.path().join("sales.csv");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(file, "region,amount").unwrap();
        writeln!(file, "North,100.50").unwrap();
        writeln!(file, "South,200.25").unwrap();
        drop(file);

        let store = LanceDbStore::connect(config.database.clone()).await.unwrap();
        let embedder = OllamaEmbeddingClient::new(
            config.model.base_url.clone(),
            config.model.embedding_model.clone(),
            config.database.embedding_dim,
        );
        let builder = IndexBuilder::new(&config, &store, &embedder);

        let report = builder.build_from_file(&csv_path, false).await.unwrap();
        assert!(!report.skipped);
        assert!(report.chunks_indexed > 0);
        assert_eq!(report.source, "sales.csv");

        let again = builder.build_from_file(&csv_path, false).await.unwrap();
        assert!(again.skipped);
        assert_eq!(again.content_hash, report.content_hash);
        assert_eq!(again.chunks_indexed, report.chunks_indexed);

        let forced = builder.build_from_file(&csv_path, true).await.unwrap();
        assert!(!forced.skipped);
        assert_eq!(forced.chunks_indexed, report.chunks_indexed);
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.extraction.max_file_size_mb = 0;

        let path = dir.path().join("big.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let store = LanceDbStore::connect(config.database.clone()).await.unwrap();
        let embedder = OllamaEmbeddingClient::new(
            config.model.base_url.clone(),
            config.model.embedding_model.clone(),
            config.database.embedding_dim,
        );
        let builder = IndexBuilder::new(&config, &store, &embedder);

        let err = builder.build_from_file(&path, false).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
