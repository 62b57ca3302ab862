//! Failures that reach the caller of `recommend`.
//!
//! Only retrieval is fatal per request. Classification and generation
//! problems degrade the result instead and never show up here.

use data_loader::DataLoadError;
use ml_client::MLClientError;
use thiserror::Error;

use crate::config::ConfigError;

/// Text shown to users when no recommendations can be produced
pub const USER_FACING_FAILURE: &str = "Unable to generate recommendations right now. \
Please try rephrasing your query or check your connection.";

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load catalog: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Failed to set up collaborator client: {0}")]
    Client(#[from] MLClientError),
}

impl RecommendError {
    /// Message suitable for an end user, without internal detail
    pub fn user_message(&self) -> &'static str {
        USER_FACING_FAILURE
    }
}
