//! Core domain types for the movie catalog.
//!
//! The catalog is loaded once at start-up and never mutated afterwards, so
//! items are handed out as `Arc<CatalogItem>` and shared freely between
//! concurrent requests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a catalog row (0-based position in the catalog file).
///
/// Titles are not unique in the raw catalog, which is why ids and titles are
/// kept apart: retrieval speaks ids, the reranker speaks titles.
pub type ItemId = u32;

// =============================================================================
// Genre
// =============================================================================

/// Closed category vocabulary used both for catalog flags and for query
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    ScienceFiction,
    TvMovie,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in vocabulary order
    pub const ALL: [Genre; 19] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::TvMovie,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// Human-readable label, as it appears in catalog headers and prompts
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::ScienceFiction => "Science Fiction",
            Genre::TvMovie => "TV Movie",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    /// Parse a label (case-insensitive, surrounding whitespace ignored)
    ///
    /// Example: "science fiction" -> Some(Genre::ScienceFiction)
    ///          "Sci-Fi" -> None
    pub fn from_label(s: &str) -> Option<Genre> {
        let s = s.trim();
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// One catalog row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub overview: String,
    /// Raw release date as found in the catalog (usually `YYYY-MM-DD`)
    pub release_date: Option<String>,
    /// Year taken from the first four digits of `release_date`
    pub year: Option<u16>,
    pub popularity: Option<f32>,
    pub vote_count: Option<u32>,
    pub vote_average: Option<f32>,
    pub original_language: Option<String>,
    /// Category flags, in vocabulary order
    pub genres: Vec<Genre>,
    pub poster_url: Option<String>,
}

impl CatalogItem {
    /// Minimal item with only the required fields set
    pub fn new(id: ItemId, title: impl Into<String>, overview: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: overview.into(),
            release_date: None,
            year: None,
            popularity: None,
            vote_count: None,
            vote_average: None,
            original_language: None,
            genres: Vec::new(),
            poster_url: None,
        }
    }

    pub fn with_genres(mut self, genres: Vec<Genre>) -> Self {
        self.genres = genres;
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.year = year_from_date(&date);
        self.release_date = Some(date);
        self
    }

    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = Some(url.into());
        self
    }
}

/// Extract the year from a release date
///
/// Example: "2021-12-15" -> Some(2021)
///          "unknown" -> None
pub(crate) fn year_from_date(date: &str) -> Option<u16> {
    let prefix = date.trim().get(..4)?;
    if prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

// =============================================================================
// Catalog - The In-Memory Item Store
// =============================================================================

/// Holds every catalog item plus secondary indices for lookups by title and
/// by genre.
#[derive(Debug)]
pub struct Catalog {
    pub(crate) items: HashMap<ItemId, Arc<CatalogItem>>,
    /// Items sharing an exact title, in insertion order
    pub(crate) title_index: HashMap<String, Vec<ItemId>>,
    pub(crate) genre_index: HashMap<Genre, Vec<ItemId>>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            title_index: HashMap::new(),
            genre_index: HashMap::new(),
        }
    }

    /// Get an item by id
    pub fn get_item(&self, id: ItemId) -> Option<&Arc<CatalogItem>> {
        self.items.get(&id)
    }

    /// Get ids of every item with exactly this title
    ///
    /// Returns an empty slice if no item has the title
    pub fn get_items_by_title(&self, title: &str) -> &[ItemId] {
        self.title_index
            .get(title)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get ids of every item flagged with a genre
    pub fn get_items_by_genre(&self, genre: Genre) -> &[ItemId] {
        self.genre_index
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Case-insensitive substring search over titles.
    ///
    /// Exact matches come first, then substring matches; each group is
    /// ordered by id.
    pub fn search_titles(&self, needle: &str) -> Vec<Arc<CatalogItem>> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(u8, Arc<CatalogItem>)> = self
            .items
            .values()
            .filter_map(|item| {
                let title = item.title.to_lowercase();
                if title == needle {
                    Some((0, item.clone()))
                } else if title.contains(&needle) {
                    Some((1, item.clone()))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        matches.into_iter().map(|(_, item)| item).collect()
    }

    /// Insert an item and update the secondary indices.
    ///
    /// Re-inserting an existing id replaces the row.
    pub fn insert_item(&mut self, item: CatalogItem) {
        if let Some(previous) = self.items.remove(&item.id) {
            self.unindex(&previous);
        }

        self.title_index
            .entry(item.title.clone())
            .or_default()
            .push(item.id);

        for &genre in &item.genres {
            self.genre_index.entry(genre).or_default().push(item.id);
        }

        self.items.insert(item.id, Arc::new(item));
    }

    fn unindex(&mut self, item: &CatalogItem) {
        if let Some(ids) = self.title_index.get_mut(&item.title) {
            ids.retain(|&id| id != item.id);
            if ids.is_empty() {
                self.title_index.remove(&item.title);
            }
        }
        for genre in &item.genres {
            if let Some(ids) = self.genre_index.get_mut(genre) {
                ids.retain(|&id| id != item.id);
            }
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct titles
    pub fn distinct_titles(&self) -> usize {
        self.title_index.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
