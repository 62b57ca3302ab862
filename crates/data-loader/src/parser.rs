//! Parser for the catalog CSV file.
//!
//! Expected header (column order is free, extra columns are ignored):
//! - required: `Title`, `Overview`
//! - optional: `Release_Date`, `Popularity`, `Vote_Count`, `Vote_Average`,
//!   `Original_Language`, `Poster_Url`, `Genre`
//! - one-hot flag columns named after a genre label (`Action`, `TV Movie`, ...)
//!
//! Overviews contain commas, quotes and newlines, so the file is read with a
//! real CSV reader rather than by splitting lines.

use crate::error::{open_file, DataLoadError, Result};
use crate::types::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// Column positions resolved once from the header row
struct Columns {
    title: usize,
    overview: usize,
    release_date: Option<usize>,
    popularity: Option<usize>,
    vote_count: Option<usize>,
    vote_average: Option<usize>,
    original_language: Option<usize>,
    poster_url: Option<usize>,
    genre_list: Option<usize>,
    genre_flags: Vec<(usize, Genre)>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord, file: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| DataLoadError::MissingColumn {
                file: file.to_string(),
                column: name.to_string(),
            })
        };

        let genre_flags = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| Genre::from_label(h).map(|genre| (idx, genre)))
            .collect();

        Ok(Self {
            title: require("Title")?,
            overview: require("Overview")?,
            release_date: find("Release_Date"),
            popularity: find("Popularity"),
            vote_count: find("Vote_Count"),
            vote_average: find("Vote_Average"),
            original_language: find("Original_Language"),
            poster_url: find("Poster_Url"),
            genre_list: find("Genre"),
            genre_flags,
        })
    }
}

/// Parse the catalog CSV file into items with ids `0..n` in row order.
pub fn parse_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let file = open_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_catalog_reader(file, &name)
}

/// Parse catalog rows from any reader (used directly by tests)
pub fn parse_catalog_reader<R: std::io::Read>(reader: R, file: &str) -> Result<Vec<CatalogItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?, file)?;
    let mut items = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line_no = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        let field = |col: usize| record.get(col).unwrap_or("").trim();
        let optional = |col: Option<usize>| col.map(field).filter(|v| !v.is_empty());

        let title = field(columns.title);
        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Missing title".to_string(),
            });
        }

        let id = ItemId::try_from(items.len()).map_err(|_| DataLoadError::ValidationError(
            format!("{} has more rows than item ids can address", file),
        ))?;

        let release_date = optional(columns.release_date).map(str::to_string);
        let item = CatalogItem {
            id,
            title: title.to_string(),
            overview: field(columns.overview).to_string(),
            year: release_date.as_deref().and_then(year_from_date),
            release_date,
            popularity: parse_number(optional(columns.popularity), "Popularity", file, line_no)?,
            vote_count: parse_number(optional(columns.vote_count), "Vote_Count", file, line_no)?,
            vote_average: parse_number(optional(columns.vote_average), "Vote_Average", file, line_no)?,
            original_language: optional(columns.original_language).map(str::to_string),
            genres: collect_genres(&columns, &record),
            poster_url: optional(columns.poster_url).map(str::to_string),
        };

        items.push(item);
    }

    Ok(items)
}

/// Parse an optional numeric cell, reporting the line on failure
fn parse_number<T: FromStr>(
    value: Option<&str>,
    column: &str,
    file: &str,
    line: usize,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: format!("Invalid {}: {} ({})", column, v, e),
            })
        })
        .transpose()
}

/// Merge the `Genre` list column and the one-hot flag columns
fn collect_genres(columns: &Columns, record: &csv::StringRecord) -> Vec<Genre> {
    let mut genres = BTreeSet::new();

    if let Some(col) = columns.genre_list {
        let list = record.get(col).unwrap_or("");
        genres.extend(list.split(',').filter_map(Genre::from_label));
    }

    for &(col, genre) in &columns.genre_flags {
        if is_flag_set(record.get(col).unwrap_or("")) {
            genres.insert(genre);
        }
    }

    // BTreeSet over the enum yields vocabulary order
    genres.into_iter().collect()
}

/// Flag cells are written by pandas as `1`, `1.0` or `True`
fn is_flag_set(cell: &str) -> bool {
    let cell = cell.trim();
    cell == "1" || cell == "1.0" || cell.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Release_Date,Title,Overview,Popularity,Vote_Count,Vote_Average,Original_Language,Genre,Poster_Url,Action,Horror,Science Fiction
2021-12-15,Spider-Man: No Way Home,\"Peter Parker is unmasked, and no longer able to separate his normal life from the high-stakes of being a super-hero.\",5083.954,8940,8.3,en,\"Action, Adventure\",https://image.tmdb.org/t/p/original/1g0dhYtq4irTY1GPXvft6k4YLjm.jpg,1,0,1
,The Shining,\"Jack Torrance accepts a caretaker job.
He slowly loses his mind.\",,,,en,,,0,1,0
";

    #[test]
    fn test_parse_quoted_multiline_rows() {
        let items = parse_catalog_reader(SAMPLE.as_bytes(), "movies.csv").unwrap();
        assert_eq!(items.len(), 2);

        let spidey = &items[0];
        assert_eq!(spidey.id, 0);
        assert_eq!(spidey.title, "Spider-Man: No Way Home");
        assert!(spidey.overview.contains("unmasked, and"));
        assert_eq!(spidey.year, Some(2021));
        assert_eq!(spidey.vote_count, Some(8940));
        assert_eq!(
            spidey.genres,
            vec![Genre::Action, Genre::Adventure, Genre::ScienceFiction]
        );

        let shining = &items[1];
        assert_eq!(shining.id, 1);
        assert!(shining.overview.contains("loses his mind"));
        assert_eq!(shining.release_date, None);
        assert_eq!(shining.popularity, None);
        assert_eq!(shining.poster_url, None);
        assert_eq!(shining.genres, vec![Genre::Horror]);
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_catalog_reader("Title,Popularity\nHeat,1.0\n".as_bytes(), "movies.csv")
            .unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { ref column, .. } if column == "Overview"));
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let csv = "Title,Overview,Vote_Count\nHeat,Crime saga,lots\n";
        let err = parse_catalog_reader(csv.as_bytes(), "movies.csv").unwrap_err();
        match err {
            DataLoadError::ParseError { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("Vote_Count"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flag_values() {
        assert!(is_flag_set("1"));
        assert!(is_flag_set("1.0"));
        assert!(is_flag_set("True"));
        assert!(!is_flag_set("0"));
        assert!(!is_flag_set(""));
    }
}
