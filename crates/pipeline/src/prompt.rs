//! Generation request construction.
//!
//! The generator is asked to answer in a fixed line format that
//! [`crate::parser`] understands. Nothing here trusts that it will.

use crate::types::CandidateSet;
use data_loader::Genre;

/// Prompt pair sent to the generator, plus the titles it enumerates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Enumerated titles, in listing order
    pub titles: Vec<String>,
}

const NO_LABELS: &str = "none identified";

/// Build the request for one query.
///
/// Candidates are enumerated from 1 in the order given. Overviews are
/// collapsed onto one line so each candidate occupies exactly one line.
pub fn build_request(query: &str, candidates: &CandidateSet, labels: &[Genre]) -> GenerationRequest {
    let genres = if labels.is_empty() {
        NO_LABELS.to_string()
    } else {
        labels.iter().map(Genre::label).collect::<Vec<_>>().join(", ")
    };

    let system_prompt = format!(
        "You are a movie recommendation assistant. A user described what they want to watch, \
and you are given a numbered list of candidate movies with their overviews.\n\
Genres predicted for the query: {genres}.\n\
\n\
Rules:\n\
1. Rank every listed movie from most to least relevant to the query.\n\
2. For each movie, explain in 1-2 sentences why it fits, using only its overview.\n\
3. Copy each title exactly as it appears in the list.\n\
4. Do not invent titles, and do not add any text before or after the list.\n\
5. Answer with one line per movie, in this format:\n\
<rank>. <Movie Title> - <explanation>"
    );

    let mut titles = Vec::with_capacity(candidates.len());
    let mut listing = String::new();
    for (position, item) in candidates.iter().enumerate() {
        let index = position + 1;
        listing.push_str(&format!(
            "{index}. {} - {}\n",
            item.title,
            single_line(&item.overview)
        ));
        titles.push(item.title.clone());
    }

    let user_prompt = format!("User's query: {}\n\nMovie list:\n{listing}", single_line(query));

    GenerationRequest {
        system_prompt,
        user_prompt,
        titles,
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
