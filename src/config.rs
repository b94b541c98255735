// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    pub splitter: SplitterConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub table_name: String,
    pub embedding_dim: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub retrieval_k: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    pub enable_ocr: bool,
    pub ocr_dpi: u32,
    pub excel_chunk_rows: usize,
    pub csv_group_threshold: usize,
    pub group_max_distinct: usize,
    pub max_file_size_mb: usize,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FINRAG")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                uri: "data/lancedb".to_string(),
                table_name: "financial_chunks".to_string(),
                embedding_dim: 768,
            },
            model: ModelConfig {
                base_url: "http://localhost:11434".to_string(),
                embedding_model: "nomic-embed-text".to_string(),
                generation_model: "llama3".to_string(),
                retrieval_k: 100,
            },
            splitter: SplitterConfig {
                chunk_size: 1500,
                chunk_overlap: 300,
            },
            extraction: ExtractionConfig {
                enable_ocr: true,
                ocr_dpi: 150,
                excel_chunk_rows: 200,
                csv_group_threshold: 100,
                group_max_distinct: 20,
                max_file_size_mb: 50,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database.embedding_dim == 0 {
            return Err(PipelineError::Config(
                "embedding_dim must be greater than 0".to_string(),
            ));
        }

        if self.splitter.chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            return Err(PipelineError::Config(
                "chunk_overlap must be smaller than chunk_size".to_string(),
            ));
        }

        if self.model.retrieval_k == 0 {
            return Err(PipelineError::Config(
                "retrieval_k must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.splitter.chunk_size, 1500);
        assert_eq!(config.splitter.chunk_overlap, 300);
        assert_eq!(config.model.retrieval_k, 100);
    }

    #[test]
    fn test_overlap_must_be_below_chunk_size() {
        let mut config = Config::default_config();
        config.splitter.chunk_overlap = 1500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_embedding_dim_rejected() {
        let mut config = Config::default_config();
        config.database.embedding_dim = 0;
        assert!(config.validate().is_err());
    }
}
