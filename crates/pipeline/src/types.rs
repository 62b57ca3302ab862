//! Types flowing between the resolver, the reranker and the caller.

use data_loader::{CatalogItem, Genre, ItemId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Retrieved items, title-unique, in retrieval order
pub type CandidateSet = Vec<Arc<CatalogItem>>;

/// One parsed generator line: a title and why it fits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedExplanation {
    pub title: String,
    pub explanation: String,
}

impl RankedExplanation {
    pub fn new(title: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            explanation: explanation.into(),
        }
    }
}

/// A catalog row with an explanation attached, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub title: String,
    pub overview: String,
    pub explanation: String,
    /// True when the generator said nothing usable about this item
    pub is_fallback: bool,
    pub release_date: Option<String>,
    pub year: Option<u16>,
    pub genres: Vec<Genre>,
    pub poster_url: Option<String>,
    pub popularity: Option<f32>,
    pub vote_average: Option<f32>,
}

impl Recommendation {
    pub fn from_item(item: &CatalogItem, explanation: impl Into<String>, is_fallback: bool) -> Self {
        Self {
            item_id: item.id,
            title: item.title.clone(),
            overview: item.overview.clone(),
            explanation: explanation.into(),
            is_fallback,
            release_date: item.release_date.clone(),
            year: item.year,
            genres: item.genres.clone(),
            poster_url: item.poster_url.clone(),
            popularity: item.popularity,
            vote_average: item.vote_average,
        }
    }
}

/// A non-essential collaborator let the request down and the result was
/// produced at reduced quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Degradation {
    /// No labels reached the prompt
    ClassificationUnavailable,
    /// The generator failed or timed out
    GenerationUnavailable,
    /// The generator answered but no line followed the format
    GenerationUnparseable,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Degradation::ClassificationUnavailable => "classification unavailable",
            Degradation::GenerationUnavailable => "generation unavailable",
            Degradation::GenerationUnparseable => "generation unparseable",
        };
        f.write_str(text)
    }
}
