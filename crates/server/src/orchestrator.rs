//! # Recommendation Orchestrator
//!
//! This module coordinates the entire recommendation pipeline:
//! 1. Classify the query and retrieve candidates (concurrently)
//! 2. Resolve candidate ids into title-unique catalog rows
//! 3. Rerank and explain the rows with the generator
//! 4. Return every resolved row, in reranked order
//!
//! ## Failure policy
//! - Retrieval failure or timeout aborts the request
//! - Classification failure or timeout continues with no labels
//! - Generation failure is absorbed by the reranker

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument, warn};

use data_loader::{Catalog, CatalogStore, Genre, ItemId};
use ml_client::{ChatCompletionClient, OllamaEmbedder, ZeroShotClassifierClient};
use pipeline::{CatalogResolver, Degradation, Recommendation, Reranker};
use sources::{Candidate, LabelPrediction, QueryClassifier, SemanticSource, SourceError};

use crate::config::RecommenderConfig;
use crate::error::RecommendError;

/// Upper bounds for the stages the orchestrator awaits directly. The
/// generation bound lives on the [`Reranker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub classify: Duration,
    pub retrieve: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            classify: Duration::from_secs(10),
            retrieve: Duration::from_secs(10),
        }
    }
}

/// Final answer for one query
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    pub query: String,
    /// Accepted labels that shaped the prompt
    pub labels: Vec<Genre>,
    pub items: Vec<Recommendation>,
    pub degradations: Vec<Degradation>,
}

impl RecommendationResult {
    fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            labels: Vec::new(),
            items: Vec::new(),
            degradations: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Main orchestrator that coordinates the recommendation pipeline
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    classifier: QueryClassifier,
    source: SemanticSource,
    resolver: Arc<CatalogResolver>,
    reranker: Reranker,
    timeouts: StageTimeouts,
}

impl RecommendationOrchestrator {
    pub fn new(
        catalog: Arc<Catalog>,
        classifier: QueryClassifier,
        source: SemanticSource,
        resolver: CatalogResolver,
        reranker: Reranker,
        timeouts: StageTimeouts,
    ) -> Self {
        Self {
            catalog,
            classifier,
            source,
            resolver: Arc::new(resolver),
            reranker,
            timeouts,
        }
    }

    /// Wire the real collaborators described by `config` around a loaded store.
    ///
    /// No collaborator is contacted here. The classifier connection is lazy,
    /// so a classifier that is down only degrades the requests that need it.
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &RecommenderConfig, store: CatalogStore) -> Result<Self, RecommendError> {
        config.validate()?;

        let scorer = ZeroShotClassifierClient::connect_lazy(
            config.classifier_addr.clone(),
            Some(config.classify_timeout()),
        )?;
        let embedder = OllamaEmbedder::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
            config.retrieve_timeout(),
        )?;
        let mut generator = ChatCompletionClient::new(
            config.generation_url.clone(),
            config.generation_model.clone(),
            config.groq_api_key.clone(),
            config.generate_timeout(),
        )?;
        if let Some(temperature) = config.generation_temperature {
            generator = generator.with_temperature(temperature);
        }

        if let Some(model) = store.embeddings.model() {
            if model != config.embedding_model {
                warn!(
                    "Embeddings were built with '{}' but queries use '{}'",
                    model, config.embedding_model
                );
            }
        }

        let classifier = QueryClassifier::new(Arc::new(scorer)).with_threshold(config.label_threshold);
        let source = SemanticSource::new(Arc::new(embedder), store.embeddings.clone());
        let resolver = CatalogResolver::new(store.catalog.clone()).with_policy(config.duplicate_policy);
        let reranker = Reranker::new(Arc::new(generator))
            .with_fallback_explanation(config.fallback_explanation.clone())
            .with_timeout(config.generate_timeout());

        Ok(Self::new(
            store.catalog,
            classifier,
            source,
            resolver,
            reranker,
            StageTimeouts {
                classify: config.classify_timeout(),
                retrieve: config.retrieve_timeout(),
            },
        ))
    }

    /// Main entry point: recommend up to `top_k` items for a free-text query
    ///
    /// Every resolved candidate appears exactly once in the result. An empty
    /// candidate set is an empty result, not an error.
    #[instrument(skip(self))]
    pub async fn recommend(&self, query: &str, top_k: usize) -> Result<RecommendationResult, RecommendError> {
        let start_time = Instant::now();
        let query = query.trim();
        if query.is_empty() || top_k == 0 {
            info!("Nothing to recommend for an empty query or zero top_k");
            return Ok(RecommendationResult::empty(query));
        }

        let (labels, candidates) = tokio::join!(self.classify(query), self.retrieve(query, top_k));

        let mut degradations = Vec::new();
        let labels = match labels {
            Ok(labels) => labels,
            Err(e) => {
                warn!("Continuing without labels: {}", e);
                degradations.push(Degradation::ClassificationUnavailable);
                Vec::new()
            }
        };
        let candidates = candidates?;
        info!(
            "Predicted {} labels, retrieved {} candidates",
            labels.len(),
            candidates.len()
        );

        let ids: Vec<ItemId> = candidates.iter().map(|c| c.item_id).collect();
        let candidate_set = self.resolver.resolve(&ids);

        let outcome = self.reranker.rerank(query, &candidate_set, &labels).await;
        degradations.extend(outcome.degradation);

        info!(
            "Recommended {} items in {:.2?}",
            outcome.recommendations.len(),
            start_time.elapsed()
        );
        Ok(RecommendationResult {
            query: query.to_string(),
            labels,
            items: outcome.recommendations,
            degradations,
        })
    }

    /// Scored labels for a query, highest confidence first
    pub async fn predict_labels(&self, query: &str) -> Result<Vec<LabelPrediction>, SourceError> {
        match tokio::time::timeout(self.timeouts.classify, self.classifier.predict(query)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::ClassificationUnavailable(format!(
                "timed out after {:?}",
                self.timeouts.classify
            ))),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn label_threshold(&self) -> f32 {
        self.classifier.threshold()
    }

    async fn classify(&self, query: &str) -> Result<Vec<Genre>, SourceError> {
        match tokio::time::timeout(self.timeouts.classify, self.classifier.classify(query)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::ClassificationUnavailable(format!(
                "timed out after {:?}",
                self.timeouts.classify
            ))),
        }
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Candidate>, RecommendError> {
        match tokio::time::timeout(self.timeouts.retrieve, self.source.get_candidates(query, top_k)).await {
            Ok(Ok(candidates)) => Ok(candidates),
            Ok(Err(e)) => {
                warn!("Retrieval failed: {}", e);
                Err(RecommendError::RetrievalUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!("Retrieval timed out after {:?}", self.timeouts.retrieve);
                Err(RecommendError::RetrievalUnavailable(format!(
                    "timed out after {:?}",
                    self.timeouts.retrieve
                )))
            }
        }
    }
}
