//! Recommender configuration, read from environment variables.
//!
//! A `.env` file in the working directory is loaded first, so the generation
//! key can live there. Every setting has a default except the key itself.

use std::path::PathBuf;
use std::time::Duration;

use ml_client::embedder::{DEFAULT_EMBEDDING_MODEL, DEFAULT_OLLAMA_URL};
use ml_client::generator::{DEFAULT_GENERATION_MODEL, DEFAULT_GENERATION_URL};
use pipeline::{DuplicatePolicy, DEFAULT_FALLBACK_EXPLANATION};
use serde::Deserialize;
use sources::DEFAULT_LABEL_THRESHOLD;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommenderConfig {
    /// Catalog CSV
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Precomputed overview embeddings
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Must match the model the embeddings file was built with
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// gRPC address of the zero-shot classification service
    #[serde(default = "default_classifier_addr")]
    pub classifier_addr: String,

    #[serde(default = "default_generation_url")]
    pub generation_url: String,

    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    #[serde(default)]
    pub generation_temperature: Option<f32>,

    #[serde(default)]
    pub groq_api_key: Option<String>,

    /// Labels need a confidence strictly above this
    #[serde(default = "default_label_threshold")]
    pub label_threshold: f32,

    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default = "default_fallback_explanation")]
    pub fallback_explanation: String,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    #[serde(default = "default_classify_timeout_ms")]
    pub classify_timeout_ms: u64,

    #[serde(default = "default_retrieve_timeout_ms")]
    pub retrieve_timeout_ms: u64,

    #[serde(default = "default_generate_timeout_ms")]
    pub generate_timeout_ms: u64,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/movies.csv")
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from("data/overview_index.json")
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_classifier_addr() -> String {
    "http://localhost:50051".to_string()
}

fn default_generation_url() -> String {
    DEFAULT_GENERATION_URL.to_string()
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_label_threshold() -> f32 {
    DEFAULT_LABEL_THRESHOLD
}

fn default_top_k() -> usize {
    5
}

fn default_fallback_explanation() -> String {
    DEFAULT_FALLBACK_EXPLANATION.to_string()
}

fn default_classify_timeout_ms() -> u64 {
    10_000
}

fn default_retrieve_timeout_ms() -> u64 {
    10_000
}

fn default_generate_timeout_ms() -> u64 {
    30_000
}

impl RecommenderConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Read configuration from explicit key/value pairs (upper-case keys)
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: RecommenderConfig = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.label_threshold) {
            return Err(ConfigError::Invalid(format!(
                "label_threshold must be within [0, 1], got {}",
                self.label_threshold
            )));
        }
        if self.default_top_k == 0 {
            return Err(ConfigError::Invalid("default_top_k must be at least 1".to_string()));
        }
        for (name, value) in [
            ("classify_timeout_ms", self.classify_timeout_ms),
            ("retrieve_timeout_ms", self.retrieve_timeout_ms),
            ("generate_timeout_ms", self.generate_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }

    pub fn retrieve_timeout(&self) -> Duration {
        Duration::from_millis(self.retrieve_timeout_ms)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_millis(self.generate_timeout_ms)
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            embeddings_path: default_embeddings_path(),
            ollama_url: default_ollama_url(),
            embedding_model: default_embedding_model(),
            classifier_addr: default_classifier_addr(),
            generation_url: default_generation_url(),
            generation_model: default_generation_model(),
            generation_temperature: None,
            groq_api_key: None,
            label_threshold: default_label_threshold(),
            default_top_k: default_top_k(),
            fallback_explanation: default_fallback_explanation(),
            duplicate_policy: DuplicatePolicy::default(),
            classify_timeout_ms: default_classify_timeout_ms(),
            retrieve_timeout_ms: default_retrieve_timeout_ms(),
            generate_timeout_ms: default_generate_timeout_ms(),
        }
    }
}
