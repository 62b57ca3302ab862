//! Catalog building and the start-up loading step.
//!
//! `CatalogStore::load` is the single place where the process reads its
//! read-only inputs: the catalog CSV and the precomputed embedding index.
//! Both are parsed in parallel, cross-checked, and handed out behind `Arc`.

use crate::embeddings::EmbeddingIndex;
use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

impl Catalog {
    /// Build a catalog from parsed items
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut catalog = Catalog::new();
        for item in items {
            catalog.insert_item(item);
        }
        catalog
    }

    /// Load the catalog CSV on its own
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let items = parser::parse_catalog(path)?;
        Ok(Self::from_items(items))
    }
}

/// Process-wide read-only inputs of the recommendation pipeline
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pub catalog: Arc<Catalog>,
    pub embeddings: Arc<EmbeddingIndex>,
}

impl CatalogStore {
    /// Load the catalog and the embedding index.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Build the catalog indices
    /// 3. Validate that every index entry points at a catalog row
    pub fn load(catalog_path: &Path, embeddings_path: &Path) -> Result<Self> {
        info!(
            catalog = %catalog_path.display(),
            embeddings = %embeddings_path.display(),
            "Loading catalog store"
        );

        let (items, embeddings) = rayon::join(
            || parser::parse_catalog(catalog_path),
            || EmbeddingIndex::load_from_file(embeddings_path),
        );
        let items = items?;
        let embeddings = embeddings?;

        let catalog = Catalog::from_items(items);
        let store = Self::new(catalog, embeddings)?;

        info!(
            items = store.catalog.len(),
            distinct_titles = store.catalog.distinct_titles(),
            vectors = store.embeddings.len(),
            dimension = store.embeddings.dimension(),
            "Catalog store ready"
        );
        Ok(store)
    }

    /// Assemble a store from already-built parts, validating them together
    pub fn new(catalog: Catalog, embeddings: EmbeddingIndex) -> Result<Self> {
        validate(&catalog, &embeddings)?;
        Ok(Self {
            catalog: Arc::new(catalog),
            embeddings: Arc::new(embeddings),
        })
    }
}

/// Check that the index is consistent with the catalog.
///
/// Every entry must refer to an existing item, and when the index recorded a
/// title it must match that item's title. Catalog rows without a vector are
/// allowed (they can simply never be retrieved) but are reported.
pub fn validate(catalog: &Catalog, embeddings: &EmbeddingIndex) -> Result<()> {
    for entry in embeddings.entries() {
        let item = catalog
            .get_item(entry.item_id)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "CatalogItem".to_string(),
                id: entry.item_id,
            })?;

        if let Some(title) = &entry.title {
            if title != &item.title {
                return Err(DataLoadError::ValidationError(format!(
                    "Index entry for item {} has title '{}' but the catalog says '{}'",
                    entry.item_id, title, item.title
                )));
            }
        }
    }

    if embeddings.len() < catalog.len() {
        warn!(
            missing = catalog.len() - embeddings.len(),
            "Some catalog items have no embedding and will never be retrieved"
        );
    }
    Ok(())
}
