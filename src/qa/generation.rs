// file: src/qa/generation.rs
// description: Ollama API integration for text generation
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::error::{PipelineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaGenerateOptions,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

pub struct OllamaGenerationClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerationClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
        }
    }

    /// Run one non-streaming completion at temperature 0. Deterministic
    /// output matters more than variety for numeric question answering.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaGenerateOptions { temperature: 0.0 },
        };

        debug!("generating with {} ({} char prompt)", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Generation(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PipelineError::Generation(format!(
                "generation request failed with status {status}: {body}"
            )));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Generation(format!("invalid response: {e}")))?;

        // the model's text comes back verbatim, no post-processing
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_kept_verbatim() {
        let parsed: OllamaGenerateResponse =
            serde_json::from_str(r#"{"response":"  $1,500.00 total\n"}"#).unwrap();
        assert_eq!(parsed.response, "  $1,500.00 total\n");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let client = OllamaGenerationClient::new(
            "http://127.0.0.1:1".to_string(),
            "llama3".to_string(),
        );
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }
}
