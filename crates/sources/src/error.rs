//! Failures of the query-side collaborators.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// The classification service could not be reached or answered nonsense.
    /// Callers may continue without labels.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// No candidates can be produced for this request
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),
}
