//! Ollama embeddings client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Embedder, MLClientError};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Embeds text with a local Ollama server.
///
/// The model must be the one the overview index was built with, otherwise
/// query vectors land in a different space.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MLClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MLClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MLClientError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&OllamaRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MLClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| MLClientError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        if result.embedding.is_empty() {
            return Err(MLClientError::InvalidResponse(
                "Empty embedding in response".to_string(),
            ));
        }
        Ok(result.embedding)
    }
}
