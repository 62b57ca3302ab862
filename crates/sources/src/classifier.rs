//! Query Classifier - multi-label genre inference for free-text queries
//!
//! ## Algorithm
//! 1. Send the query and the whole genre vocabulary to the scoring service
//! 2. Keep the scores of vocabulary labels, drop anything else
//! 3. Accept labels whose confidence is strictly above the threshold
//!
//! Labels are scored independently, so a query can land in several genres
//! (or none).

use crate::error::SourceError;
use crate::types::LabelPrediction;
use data_loader::Genre;
use ml_client::LabelScorer;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Confidence a label needs to exceed to be passed downstream
pub const DEFAULT_LABEL_THRESHOLD: f32 = 0.4;

#[derive(Clone)]
pub struct QueryClassifier {
    scorer: Arc<dyn LabelScorer>,
    vocabulary: Vec<Genre>,
    threshold: f32,
}

impl QueryClassifier {
    /// Create a classifier over the full genre vocabulary
    pub fn new(scorer: Arc<dyn LabelScorer>) -> Self {
        Self {
            scorer,
            vocabulary: Genre::ALL.to_vec(),
            threshold: DEFAULT_LABEL_THRESHOLD,
        }
    }

    /// Configure the acceptance threshold (default: 0.4)
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Restrict the vocabulary sent to the scorer
    pub fn with_vocabulary(mut self, vocabulary: Vec<Genre>) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Score every vocabulary label against the query.
    ///
    /// Returns predictions ordered by confidence, highest first; ties keep
    /// vocabulary order. A blank query scores nothing and makes no call.
    #[instrument(skip(self))]
    pub async fn predict(&self, query: &str) -> Result<Vec<LabelPrediction>, SourceError> {
        if query.trim().is_empty() || self.vocabulary.is_empty() {
            return Ok(Vec::new());
        }

        let labels: Vec<String> = self
            .vocabulary
            .iter()
            .map(|genre| genre.label().to_string())
            .collect();

        let scores = self
            .scorer
            .score_labels(query, &labels)
            .await
            .map_err(|e| SourceError::ClassificationUnavailable(e.to_string()))?;

        let mut predictions: Vec<LabelPrediction> = self
            .vocabulary
            .iter()
            .filter_map(|&genre| {
                let confidence = *scores.get(genre.label())?;
                if !confidence.is_finite() {
                    warn!("Ignoring non-finite score for {}", genre);
                    return None;
                }
                Some(LabelPrediction {
                    label: genre,
                    confidence,
                })
            })
            .collect();

        // Stable sort, so equal scores stay in vocabulary order
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(predictions)
    }

    /// Labels whose confidence is strictly greater than the threshold.
    pub async fn classify(&self, query: &str) -> Result<Vec<Genre>, SourceError> {
        let accepted: Vec<Genre> = self
            .predict(query)
            .await?
            .into_iter()
            .filter(|p| p.confidence > self.threshold)
            .map(|p| p.label)
            .collect();

        debug!("Accepted {} labels: {:?}", accepted.len(), accepted);
        Ok(accepted)
    }
}
