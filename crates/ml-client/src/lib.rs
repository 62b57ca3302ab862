//! Clients for the external model services the recommender depends on.
//!
//! This crate provides:
//! - The collaborator contracts (`Embedder`, `LabelScorer`, `TextGenerator`)
//!   that the pipeline stages are written against
//! - A gRPC client for the Python zero-shot classification service
//! - An HTTP client for Ollama embeddings
//! - An HTTP client for OpenAI-compatible chat completions (Groq)
//!
//! Every call is a single request/response; none of the clients retry. The
//! pipeline decides what a failure means for the request.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub mod classifier;
pub mod embedder;
pub mod generator;

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("classifier");
}

pub use classifier::ZeroShotClassifierClient;
pub use embedder::OllamaEmbedder;
pub use generator::ChatCompletionClient;

/// Errors that can occur when interacting with a model service
#[derive(Error, Debug)]
pub enum MLClientError {
    #[error("Failed to connect to model service: {0}")]
    ConnectionError(String),

    #[error("Failed to score labels: {0}")]
    ScoringError(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Model service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from model service: {0}")]
    InvalidResponse(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for MLClientError {
    fn from(err: reqwest::Error) -> Self {
        MLClientError::Http(err.to_string())
    }
}

/// Turns text into a dense vector in the same space as the overview index.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, MLClientError>;
}

/// Scores a query against every label of a closed vocabulary.
///
/// Labels are scored independently (multi-label), so scores need not sum to
/// one. The returned map only contains labels that were asked for.
#[async_trait]
pub trait LabelScorer: Send + Sync {
    async fn score_labels(
        &self,
        query: &str,
        labels: &[String],
    ) -> Result<HashMap<String, f32>, MLClientError>;
}

/// Single-shot text generation from a system and a user prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, MLClientError>;
}
