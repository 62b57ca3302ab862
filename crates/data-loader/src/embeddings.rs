//! Precomputed embedding index over catalog overviews.
//!
//! The index is produced offline and shipped as JSON:
//!
//! ```json
//! { "model": "nomic-embed-text", "dimension": 768,
//!   "entries": [ { "item_id": 0, "title": "Heat", "vector": [0.01, ...] } ] }
//! ```
//!
//! Vectors are normalised once at load so a search is a plain dot product.

use crate::error::{open_file, DataLoadError, Result};
use crate::types::ItemId;
use rayon::prelude::*;
use serde::Deserialize;
use std::io::BufReader;
use std::path::Path;

/// On-disk shape of the index file
#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    model: Option<String>,
    dimension: usize,
    entries: Vec<IndexFileEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexFileEntry {
    item_id: ItemId,
    #[serde(default)]
    title: Option<String>,
    vector: Vec<f32>,
}

/// One indexed vector
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub item_id: ItemId,
    /// Title recorded when the index was built, if any
    pub title: Option<String>,
    /// Unit-length embedding
    pub(crate) vector: Vec<f32>,
}

/// A search hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem {
    pub item_id: ItemId,
    /// Cosine similarity in `[-1, 1]`
    pub similarity: f32,
}

/// Read-only nearest-neighbour index
#[derive(Debug)]
pub struct EmbeddingIndex {
    model: Option<String>,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl EmbeddingIndex {
    /// Build an index from raw vectors, normalising each one.
    ///
    /// Fails on a zero dimension, a vector of the wrong length or a zero
    /// vector (which has no direction to compare against).
    pub fn new(
        dimension: usize,
        raw: impl IntoIterator<Item = (ItemId, Option<String>, Vec<f32>)>,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(DataLoadError::ValidationError(
                "Embedding dimension must be positive".to_string(),
            ));
        }

        let entries = raw
            .into_iter()
            .map(|(item_id, title, vector)| {
                if vector.len() != dimension {
                    return Err(DataLoadError::DimensionMismatch {
                        expected: dimension,
                        found: vector.len(),
                    });
                }
                let vector = normalize(vector).ok_or_else(|| {
                    DataLoadError::ValidationError(format!(
                        "Embedding for item {} is a zero vector",
                        item_id
                    ))
                })?;
                Ok(IndexEntry {
                    item_id,
                    title,
                    vector,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            model: None,
            dimension,
            entries,
        })
    }

    /// Load the index from its JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = open_file(path)?;
        let parsed: IndexFile = serde_json::from_reader(BufReader::new(file))?;

        let mut index = Self::new(
            parsed.dimension,
            parsed
                .entries
                .into_iter()
                .map(|e| (e.item_id, e.title, e.vector)),
        )?;
        index.model = parsed.model;
        Ok(index)
    }

    /// Return the `k` entries most similar to `query`, most similar first.
    ///
    /// Ties are broken by ascending item id so results are reproducible.
    /// `k` larger than the index returns every entry.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredItem>> {
        if query.len() != self.dimension {
            return Err(DataLoadError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        // A zero query matches nothing better than anything else
        let query = normalize(query.to_vec()).unwrap_or_else(|| vec![0.0; self.dimension]);

        let mut scored: Vec<ScoredItem> = self
            .entries
            .par_iter()
            .map(|entry| ScoredItem {
                item_id: entry.item_id,
                similarity: dot(&entry.vector, &query),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        scored.truncate(k);
        Ok(scored)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding model the index was built with, when recorded
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(mut vector: Vec<f32>) -> Option<Vec<f32>> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    vector.iter_mut().for_each(|x| *x /= norm);
    Some(vector)
}
