//! Reranker / Explainer
//!
//! One generator round-trip per request. The answer is parsed, reconciled
//! against the candidate set, and any failure of the generator degrades to
//! fallback explanations in retrieval order instead of an error.

use crate::parser::parse_ranking;
use crate::prompt::build_request;
use crate::reconcile::{reconcile, ReconcileStats};
use crate::types::{CandidateSet, Degradation, Recommendation};
use data_loader::Genre;
use ml_client::TextGenerator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const DEFAULT_FALLBACK_EXPLANATION: &str =
    "Relevant aspects not clearly identified, but could be worth exploring.";

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Ranked, explained candidates plus whatever went wrong producing them
#[derive(Debug, Clone)]
pub struct RerankOutcome {
    pub recommendations: Vec<Recommendation>,
    pub stats: ReconcileStats,
    pub degradation: Option<Degradation>,
}

#[derive(Clone)]
pub struct Reranker {
    generator: Arc<dyn TextGenerator>,
    fallback_explanation: String,
    timeout: Duration,
}

impl Reranker {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            fallback_explanation: DEFAULT_FALLBACK_EXPLANATION.to_string(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_fallback_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.fallback_explanation = explanation.into();
        self
    }

    /// Upper bound on the generator round-trip
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Order and explain `candidates` for `query`.
    ///
    /// The result always holds every candidate title exactly once. An empty
    /// candidate set returns immediately without calling the generator.
    #[instrument(skip(self, candidates, labels), fields(candidate_count = candidates.len()))]
    pub async fn rerank(&self, query: &str, candidates: &CandidateSet, labels: &[Genre]) -> RerankOutcome {
        if candidates.is_empty() {
            return RerankOutcome {
                recommendations: Vec::new(),
                stats: ReconcileStats::default(),
                degradation: None,
            };
        }

        let request = build_request(query, candidates, labels);
        let call = self
            .generator
            .generate(&request.system_prompt, &request.user_prompt);

        let (parsed, degradation) = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) => {
                let titles: Vec<&str> = request.titles.iter().map(String::as_str).collect();
                let parsed = parse_ranking(&text, &titles);
                if parsed.is_empty() {
                    warn!("Generator answer had no parseable lines, using fallback explanations");
                    (parsed, Some(Degradation::GenerationUnparseable))
                } else {
                    (parsed, None)
                }
            }
            Ok(Err(e)) => {
                warn!("Generator unavailable, using fallback explanations: {}", e);
                (Vec::new(), Some(Degradation::GenerationUnavailable))
            }
            Err(_) => {
                warn!("Generator timed out after {:?}, using fallback explanations", self.timeout);
                (Vec::new(), Some(Degradation::GenerationUnavailable))
            }
        };

        let reconciliation = reconcile(parsed, candidates, &self.fallback_explanation);
        info!(
            accepted = reconciliation.stats.accepted,
            rejected = reconciliation.stats.rejected,
            backfilled = reconciliation.stats.backfilled,
            "Reranked candidates"
        );

        RerankOutcome {
            recommendations: reconciliation.recommendations,
            stats: reconciliation.stats,
            degradation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use data_loader::CatalogItem;
    use ml_client::MLClientError;
    use std::sync::Mutex;

    /// Replays a canned answer and records the prompts it was given
    struct ScriptedGenerator {
        answer: Result<String, String>,
        delay: Option<Duration>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGenerator {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(text.to_string()),
                delay: None,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: Err("service down".to_string()),
                delay: None,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok("1. A - late".to_string()),
                delay: Some(delay),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, MLClientError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answer.clone().map_err(MLClientError::Http)
        }
    }

    fn candidates(titles: &[&str]) -> CandidateSet {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| Arc::new(CatalogItem::new(i as u32, *t, "overview")))
            .collect()
    }

    fn titles(outcome: &RerankOutcome) -> Vec<&str> {
        outcome.recommendations.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_generator_order_is_followed() {
        let generator = ScriptedGenerator::answering("Sure!\n1. C - third first\n2. A - then A\n3. B - last");
        let reranker = Reranker::new(generator.clone());

        let outcome = reranker.rerank("q", &candidates(&["A", "B", "C"]), &[Genre::Horror]).await;

        assert_eq!(titles(&outcome), vec!["C", "A", "B"]);
        assert!(outcome.recommendations.iter().all(|r| !r.is_fallback));
        assert_eq!(outcome.degradation, None);
        assert_eq!(generator.calls(), 1);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("Horror"));
        assert!(prompts[0].1.contains("3. C - overview"));
    }

    #[tokio::test]
    async fn test_failing_generator_degrades() {
        let reranker = Reranker::new(ScriptedGenerator::failing()).with_fallback_explanation("no idea");
        let outcome = reranker.rerank("q", &candidates(&["A", "B"]), &[]).await;

        assert_eq!(titles(&outcome), vec!["A", "B"]);
        assert!(outcome.recommendations.iter().all(|r| r.explanation == "no idea"));
        assert_eq!(outcome.degradation, Some(Degradation::GenerationUnavailable));
    }

    #[tokio::test]
    async fn test_garbage_answer_is_unparseable() {
        let reranker = Reranker::new(ScriptedGenerator::answering("I cannot help with that."));
        let outcome = reranker.rerank("q", &candidates(&["A", "B"]), &[]).await;

        assert_eq!(titles(&outcome), vec!["A", "B"]);
        assert_eq!(outcome.degradation, Some(Degradation::GenerationUnparseable));
        assert_eq!(outcome.recommendations[0].explanation, DEFAULT_FALLBACK_EXPLANATION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_generator_times_out() {
        let reranker =
            Reranker::new(ScriptedGenerator::slow(Duration::from_secs(60))).with_timeout(Duration::from_secs(1));
        let outcome = reranker.rerank("q", &candidates(&["A"]), &[]).await;

        assert!(outcome.recommendations[0].is_fallback);
        assert_eq!(outcome.degradation, Some(Degradation::GenerationUnavailable));
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_generator() {
        let generator = ScriptedGenerator::answering("1. A - x");
        let reranker = Reranker::new(generator.clone());

        let outcome = reranker.rerank("q", &Vec::new(), &[]).await;
        assert!(outcome.recommendations.is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_candidate_title_is_not_doubled_on_fallback() {
        let reranker = Reranker::new(ScriptedGenerator::failing());
        let outcome = reranker.rerank("q", &candidates(&["Heat", "Heat", "Alien"]), &[]).await;

        assert_eq!(titles(&outcome), vec!["Heat", "Alien"]);
        assert_eq!(outcome.recommendations[0].item_id, 0);
    }
}
