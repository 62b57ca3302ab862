//! # Sources Crate
//!
//! Query-side inputs to the recommendation pipeline.
//!
//! ## Components
//!
//! ### Query Classifier
//! Multi-label genre inference:
//! - Scores every genre in the vocabulary against the query independently
//! - Keeps labels above the acceptance threshold (0.4 by default)
//! - Failures are recoverable, callers can continue with no labels
//!
//! ### Semantic Source
//! Nearest-neighbour retrieval over overview embeddings:
//! - Embeds the query with the index's model
//! - Returns the top-k item ids, most similar first
//! - Failures are fatal to the request
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{QueryClassifier, SemanticSource};
//! use data_loader::CatalogStore;
//! use ml_client::{OllamaEmbedder, ZeroShotClassifierClient};
//! use std::sync::Arc;
//!
//! let store = CatalogStore::load("data/movies.csv", "data/overview_index.json")?;
//!
//! let classifier = QueryClassifier::new(Arc::new(
//!     ZeroShotClassifierClient::connect_lazy("http://localhost:50051", None)?,
//! ));
//! let semantic = SemanticSource::new(Arc::new(embedder), store.embeddings.clone());
//!
//! // Independent of each other, so run them together
//! let (labels, candidates) = tokio::join!(
//!     classifier.classify(query),
//!     semantic.get_candidates(query, 5),
//! );
//! ```

pub mod classifier;
pub mod error;
pub mod semantic;
pub mod types;

pub use classifier::{QueryClassifier, DEFAULT_LABEL_THRESHOLD};
pub use error::SourceError;
pub use semantic::SemanticSource;
pub use types::{Candidate, LabelPrediction};
