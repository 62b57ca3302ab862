//! Semantic Source - nearest-neighbour retrieval over item overviews
//!
//! ## Algorithm
//! 1. Embed the query with the same model that built the overview index
//! 2. Search the index for the `k` most similar overviews
//! 3. Return item ids in decreasing similarity
//!
//! Retrieval is load-bearing: without it there are no candidates, so every
//! failure here is reported as `RetrievalUnavailable`.

use crate::error::SourceError;
use crate::types::Candidate;
use data_loader::EmbeddingIndex;
use ml_client::Embedder;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SemanticSource {
    embedder: Arc<dyn Embedder>,
    /// Shared read-only index, no locking needed
    index: Arc<EmbeddingIndex>,
}

impl SemanticSource {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<EmbeddingIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `k` candidates for a query, most similar first.
    ///
    /// `k == 0` returns nothing without contacting the embedder. A `k`
    /// larger than the index returns every indexed item.
    #[instrument(skip(self))]
    pub async fn get_candidates(&self, query: &str, k: usize) -> Result<Vec<Candidate>, SourceError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| SourceError::RetrievalUnavailable(e.to_string()))?;

        // Scoring every overview is CPU-bound, keep it off the async workers
        let index = self.index.clone();
        let hits = tokio::task::spawn_blocking(move || index.search(&vector, k))
            .await
            .map_err(|e| SourceError::RetrievalUnavailable(format!("Search task failed: {e}")))?
            .map_err(|e| SourceError::RetrievalUnavailable(e.to_string()))?;

        debug!("Retrieved {} candidates", hits.len());
        Ok(hits
            .into_iter()
            .map(|hit| Candidate::new(hit.item_id, hit.similarity))
            .collect())
    }
}
