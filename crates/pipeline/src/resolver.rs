//! Catalog Resolver - retrieved ids to title-unique catalog rows
//!
//! ## Algorithm
//! 1. Look up each id in the catalog, dropping (and logging) ids it lacks
//! 2. Drop rows whose title was already seen
//! 3. Keep the survivors in input order
//!
//! The raw catalog repeats some titles under different ids. Downstream the
//! title is the only key the generator sees, so it has to be unique here.

use crate::types::CandidateSet;
use data_loader::{Catalog, ItemId};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Which row survives when several retrieved ids share a title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first row in retrieval order
    #[default]
    KeepFirst,
    /// Keep the last row, placed where the title first appeared
    KeepLast,
}

pub struct CatalogResolver {
    catalog: Arc<Catalog>,
    policy: DuplicatePolicy,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Expand ids into catalog rows, deduplicated by title.
    ///
    /// Output is never longer than the input and holds no repeated title.
    #[instrument(skip(self, ids), fields(input = ids.len()))]
    pub fn resolve(&self, ids: &[ItemId]) -> CandidateSet {
        let mut candidates: CandidateSet = Vec::with_capacity(ids.len());
        // title -> slot in `candidates`
        let mut slots: HashMap<&str, usize> = HashMap::with_capacity(ids.len());

        for &id in ids {
            let Some(item) = self.catalog.get_item(id) else {
                warn!("CatalogLookupMiss: item {} is not in the catalog, dropping it", id);
                continue;
            };

            match slots.get(item.title.as_str()) {
                Some(&slot) => {
                    debug!("Duplicate title '{}' (item {})", item.title, id);
                    if self.policy == DuplicatePolicy::KeepLast {
                        candidates[slot] = item.clone();
                    }
                }
                None => {
                    slots.insert(item.title.as_str(), candidates.len());
                    candidates.push(item.clone());
                }
            }
        }

        debug!("Resolved {} of {} ids", candidates.len(), ids.len());
        candidates
    }
}
