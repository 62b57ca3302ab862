//! Server crate for the semantic movie recommender.
//!
//! This crate contains the orchestrator that coordinates all components
//! of the recommendation pipeline, plus its configuration and the errors
//! it surfaces to callers.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::{ConfigError, RecommenderConfig};
pub use error::{RecommendError, USER_FACING_FAILURE};
pub use orchestrator::{RecommendationOrchestrator, RecommendationResult, StageTimeouts};
