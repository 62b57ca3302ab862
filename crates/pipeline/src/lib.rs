//! Resolution, reranking and reconciliation of retrieved candidates.
//!
//! This crate provides:
//! - CatalogResolver for turning retrieved ids into title-unique rows
//! - Prompt construction and the line grammar for generator answers
//! - Reconciliation that keeps invented titles out and backfills skipped ones
//! - Reranker that ties the above to a text generator
//!
//! ## Architecture
//! Candidates move through the stages in order:
//! 1. The resolver expands ids into catalog rows and drops repeated titles
//! 2. The reranker asks the generator to order and explain them
//! 3. The answer is parsed line by line and reconciled against the rows
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{CatalogResolver, Reranker};
//!
//! let resolver = CatalogResolver::new(store.catalog.clone());
//! let reranker = Reranker::new(generator).with_timeout(Duration::from_secs(30));
//!
//! let candidates = resolver.resolve(&ids);
//! let outcome = reranker.rerank(query, &candidates, &labels).await;
//! ```

pub mod parser;
pub mod prompt;
pub mod reconcile;
pub mod reranker;
pub mod resolver;
pub mod types;

// Re-export main types
pub use parser::parse_ranking;
pub use prompt::{build_request, GenerationRequest};
pub use reconcile::{reconcile, ReconcileStats, Reconciliation};
pub use reranker::{
    RerankOutcome, Reranker, DEFAULT_FALLBACK_EXPLANATION, DEFAULT_GENERATION_TIMEOUT,
};
pub use resolver::{CatalogResolver, DuplicatePolicy};
pub use types::{CandidateSet, Degradation, RankedExplanation, Recommendation};
