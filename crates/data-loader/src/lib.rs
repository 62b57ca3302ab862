//! # Data Loader Crate
//!
//! Loads the read-only inputs of the recommender: the movie catalog and the
//! precomputed embedding index over item overviews.
//!
//! ## Main Components
//!
//! - **types**: `CatalogItem`, `Genre`, and the in-memory `Catalog`
//! - **parser**: Parse the catalog CSV into items
//! - **embeddings**: `EmbeddingIndex` with cosine nearest-neighbour search
//! - **index**: `CatalogStore`, the start-up loading and validation step
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::CatalogStore;
//! use std::path::Path;
//!
//! let store = CatalogStore::load(
//!     Path::new("data/movies.csv"),
//!     Path::new("data/overview_index.json"),
//! )?;
//!
//! let heat = store.catalog.get_items_by_title("Heat");
//! let hits = store.embeddings.search(&query_vector, 5)?;
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod embeddings;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use embeddings::{EmbeddingIndex, IndexEntry, ScoredItem};
pub use index::CatalogStore;
pub use types::{Catalog, CatalogItem, Genre, ItemId};
