//! Line grammar for generator answers.
//!
//! ```text
//! line        := ORDINAL ("." | ")") TITLE SEP EXPLANATION
//! SEP         := "-" | "–" | "—"
//! ```
//!
//! Titles may themselves contain hyphens ("Spider-Man"), so the split point
//! is chosen in three steps:
//! 1. a known candidate title at the start of the line, longest first,
//!    optionally wrapped in `**` or quotes, followed by a separator. A
//!    separator glued to the title is ignored if a spaced one comes later
//! 2. the first separator with whitespace on both sides
//! 3. the first bare separator
//!
//! Lines that fit none of these are skipped, which lets the parser ignore
//! any preamble or sign-off the generator adds.

use crate::types::RankedExplanation;
use regex::Regex;
use std::sync::LazyLock;

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[.)]\s*(.+)$").expect("valid ordinal pattern"));

static SPACED_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+[-–—]\s+(.+)$").expect("valid separator pattern"));

static BARE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*[-–—]\s*(.+)$").expect("valid separator pattern"));

const SEPARATORS: [char; 3] = ['-', '–', '—'];
const TITLE_WRAPPERS: [&str; 5] = ["**", "*", "\"", "“", ""];

/// Parse every conforming line of `text`, in the order the generator wrote
/// them. Duplicates and unknown titles are kept; reconciliation decides.
pub fn parse_ranking(text: &str, known_titles: &[&str]) -> Vec<RankedExplanation> {
    let mut by_length: Vec<&str> = known_titles.to_vec();
    by_length.sort_by_key(|title| std::cmp::Reverse(title.len()));

    text.lines()
        .filter_map(|line| parse_line(line, &by_length))
        .collect()
}

fn parse_line(line: &str, known_by_length: &[&str]) -> Option<RankedExplanation> {
    let captures = ORDINAL.captures(line.trim())?;
    let rest = captures.get(1)?.as_str();

    if let Some(parsed) = match_known_title(rest, known_by_length) {
        return Some(parsed);
    }

    let captures = SPACED_SEPARATOR
        .captures(rest)
        .or_else(|| BARE_SEPARATOR.captures(rest))?;
    let title = clean_title(captures.get(1)?.as_str());
    let explanation = captures.get(2)?.as_str().trim();

    if title.is_empty() || explanation.is_empty() {
        return None;
    }
    Some(RankedExplanation::new(title, explanation))
}

fn match_known_title(rest: &str, known_by_length: &[&str]) -> Option<RankedExplanation> {
    for &title in known_by_length {
        if title.is_empty() {
            continue;
        }
        for wrapper in TITLE_WRAPPERS {
            let closing = if wrapper == "“" { "”" } else { wrapper };
            let Some(after) = rest
                .strip_prefix(wrapper)
                .and_then(|r| r.strip_prefix(title))
                .and_then(|r| r.strip_prefix(closing))
            else {
                continue;
            };

            let Some(explanation) = separated_explanation(after) else {
                continue;
            };
            return Some(RankedExplanation::new(title, explanation));
        }
    }
    None
}

/// Explanation after a known title. A bare dash glued to the title only
/// counts when no spaced separator appears later, so "Heat-Seeker - x" is
/// not read as "Heat".
fn separated_explanation(after: &str) -> Option<&str> {
    let explanation = if let Some(spaced) = after.strip_prefix(char::is_whitespace) {
        spaced.trim_start().strip_prefix(SEPARATORS)?
    } else {
        let glued = after.strip_prefix(SEPARATORS)?;
        if SPACED_SEPARATOR.is_match(glued) {
            return None;
        }
        glued
    };
    let explanation = explanation.trim();
    (!explanation.is_empty()).then_some(explanation)
}

fn clean_title(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| matches!(c, '*' | '"' | '“' | '”' | '_'))
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(parsed: &[RankedExplanation]) -> Vec<&str> {
        parsed.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_basic_lines() {
        let parsed = parse_ranking("1. B - fits the mood\n2. A - strong match", &[]);
        assert_eq!(
            parsed,
            vec![
                RankedExplanation::new("B", "fits the mood"),
                RankedExplanation::new("A", "strong match"),
            ]
        );
    }

    #[test]
    fn test_preamble_and_sign_off_are_skipped() {
        let text = "Here are your picks:\n\n1. Heat - A tense heist.\nEnjoy the movies!\n- Alien - no ordinal";
        let parsed = parse_ranking(text, &[]);
        assert_eq!(titles(&parsed), vec!["Heat"]);
    }

    #[test]
    fn test_lines_without_separator_or_explanation_are_skipped() {
        let parsed = parse_ranking("1. Heat\n2. Alien - \n3. - lonely explanation", &[]);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_hyphenated_known_title_stays_whole() {
        let text = "1. Spider-Man: No Way Home - Multiverse chaos.\n2. X-Men-Origins-Wolverine-Redux-Cut-Extended - Claws.";
        let known = ["Spider-Man: No Way Home", "X-Men-Origins-Wolverine-Redux-Cut-Extended"];
        let parsed = parse_ranking(text, &known);

        assert_eq!(titles(&parsed), known.to_vec());
        assert_eq!(parsed[0].explanation, "Multiverse chaos.");
        assert_eq!(parsed[1].explanation, "Claws.");
    }

    #[test]
    fn test_longest_known_title_wins() {
        let known = ["Alien", "Aliens"];
        let parsed = parse_ranking("1. Aliens - Marines this time.", &known);
        assert_eq!(titles(&parsed), vec!["Aliens"]);
    }

    #[test]
    fn test_unknown_hyphenated_title_splits_on_spaced_dash() {
        let parsed = parse_ranking("1. Ant-Man - Small hero, big heart.", &[]);
        assert_eq!(parsed, vec![RankedExplanation::new("Ant-Man", "Small hero, big heart.")]);
    }

    #[test]
    fn test_format_variations() {
        let text = "1) **Heat** – Pacino vs De Niro.\n2.\"Alien\"—Space horror.\n3. Se7en-Grim.";
        let parsed = parse_ranking(text, &["Heat"]);

        assert_eq!(titles(&parsed), vec!["Heat", "Alien", "Se7en"]);
        assert_eq!(parsed[0].explanation, "Pacino vs De Niro.");
        assert_eq!(parsed[1].explanation, "Space horror.");
        assert_eq!(parsed[2].explanation, "Grim.");
    }

    #[test]
    fn test_duplicates_and_unknown_titles_are_kept() {
        let parsed = parse_ranking("1. Z - great pick\n2. A - good\n3. A - again", &["A"]);
        assert_eq!(titles(&parsed), vec!["Z", "A", "A"]);
    }

    #[test]
    fn test_known_title_prefix_of_longer_word_is_not_matched() {
        let parsed = parse_ranking("1. Heathers - Dark comedy.", &["Heat"]);
        assert_eq!(titles(&parsed), vec!["Heathers"]);
    }

    #[test]
    fn test_known_title_glued_to_longer_hyphenated_title_is_not_matched() {
        let parsed = parse_ranking("1. Heat-Seeker - Missiles and mayhem.", &["Heat"]);
        assert_eq!(
            parsed,
            vec![RankedExplanation::new("Heat-Seeker", "Missiles and mayhem.")]
        );

        let parsed = parse_ranking("1. Heat-Crime classic.", &["Heat"]);
        assert_eq!(parsed, vec![RankedExplanation::new("Heat", "Crime classic.")]);
    }
}
