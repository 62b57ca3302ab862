//! Types shared by the candidate and label sources.

use data_loader::{Genre, ItemId};

/// A catalog item selected by semantic retrieval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub item_id: ItemId,
    /// Cosine similarity between the query and the item overview
    pub similarity: f32,
}

impl Candidate {
    pub fn new(item_id: ItemId, similarity: f32) -> Self {
        Self {
            item_id,
            similarity,
        }
    }
}

/// One scored vocabulary label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPrediction {
    pub label: Genre,
    pub confidence: f32,
}
