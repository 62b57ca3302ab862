//! Integration tests for the pipeline.
//!
//! These tests push generator answers through parsing and reconciliation
//! and check that the result never depends on the generator behaving.

use data_loader::{Catalog, CatalogItem};
use pipeline::{
    parse_ranking, reconcile, CandidateSet, CatalogResolver, Reranker, DEFAULT_FALLBACK_EXPLANATION,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn candidate_set(titles: &[String]) -> CandidateSet {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| Arc::new(CatalogItem::new(i as u32, t.clone(), format!("All about {t}."))))
        .collect()
}

/// Run one generator answer through the same steps the reranker uses
fn rerank_text(text: &str, candidates: &CandidateSet) -> Vec<(String, String)> {
    let known: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
    let parsed = parse_ranking(text, &known);
    reconcile(parsed, candidates, DEFAULT_FALLBACK_EXPLANATION)
        .recommendations
        .into_iter()
        .map(|r| (r.title, r.explanation))
        .collect()
}

fn titles_of(rows: &[(String, String)]) -> Vec<&str> {
    rows.iter().map(|(t, _)| t.as_str()).collect()
}

fn strings(titles: &[&str]) -> Vec<String> {
    titles.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_omitted_candidate_goes_last_with_fallback() {
    let candidates = candidate_set(&strings(&["A", "B", "C"]));
    let rows = rerank_text("1. B - fits the mood\n2. A - strong match", &candidates);

    assert_eq!(titles_of(&rows), vec!["B", "A", "C"]);
    assert_eq!(rows[0].1, "fits the mood");
    assert_eq!(rows[1].1, "strong match");
    assert_eq!(rows[2].1, DEFAULT_FALLBACK_EXPLANATION);
}

#[test]
fn test_invented_title_never_surfaces() {
    let candidates = candidate_set(&strings(&["A", "B"]));
    let rows = rerank_text("1. Z - great pick\n2. A - good fit", &candidates);

    assert_eq!(
        rows,
        vec![
            ("A".to_string(), "good fit".to_string()),
            ("B".to_string(), DEFAULT_FALLBACK_EXPLANATION.to_string()),
        ]
    );
}

#[test]
fn test_realistic_answer_with_hyphenated_titles() {
    let candidates = candidate_set(&strings(&["Spider-Man", "The Shining", "Mind-Game"]));
    let text = "Here are the movies ranked for you:\n\n\
                1. The Shining - A writer's descent into madness is the whole story.\n\
                2. **Mind-Game** - A surreal trip through a fractured mind.\n\
                3. Spider-Man 4 - A hero under pressure.\n\n\
                I hope you enjoy these picks!";
    let rows = rerank_text(text, &candidates);

    assert_eq!(titles_of(&rows), vec!["The Shining", "Mind-Game", "Spider-Man"]);
    assert_eq!(rows[1].1, "A surreal trip through a fractured mind.");
    assert_eq!(rows[2].1, DEFAULT_FALLBACK_EXPLANATION);
}

#[test]
fn test_resolver_then_reconcile_with_repeated_titles() {
    let catalog = Arc::new(Catalog::from_items(vec![
        CatalogItem::new(0, "Heat", "Thieves and the cop chasing them."),
        CatalogItem::new(1, "Heat", "An older film with the same name."),
        CatalogItem::new(2, "Alien", "A crew answers a distress call."),
    ]));
    let candidates = CatalogResolver::new(catalog).resolve(&[1, 2, 0, 1]);
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].id, 1);

    let rows = rerank_text("1. Alien - Space dread.\n2. Heat - Heist.\n3. Heat - Again.", &candidates);
    assert_eq!(titles_of(&rows), vec!["Alien", "Heat"]);
    assert_eq!(rows[1].1, "Heist.");
}

#[tokio::test]
async fn test_reranker_with_unreachable_generator_keeps_order() {
    use async_trait::async_trait;
    use ml_client::{MLClientError, TextGenerator};

    struct Offline;

    #[async_trait]
    impl TextGenerator for Offline {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String, MLClientError> {
            Err(MLClientError::ConnectionError("offline".to_string()))
        }
    }

    let candidates = candidate_set(&strings(&["A", "B", "C"]));
    let outcome = Reranker::new(Arc::new(Offline)).rerank("q", &candidates, &[]).await;

    let rows: Vec<(&str, bool)> = outcome
        .recommendations
        .iter()
        .map(|r| (r.title.as_str(), r.is_fallback))
        .collect();
    assert_eq!(rows, vec![("A", true), ("B", true), ("C", true)]);
}

// =============================================================================
// Properties
// =============================================================================

fn titles_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Z][a-z]{2,8}", 1..8).prop_map(|set| set.into_iter().collect())
}

fn explanation_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,10}( [a-z]{1,10}){0,3}"
}

/// A generator line naming either a candidate (by position) or a made-up title
#[derive(Debug, Clone)]
enum Pick {
    Candidate(usize),
    Invented(String),
}

fn pick_strategy() -> impl Strategy<Value = Pick> {
    prop_oneof![
        (0usize..16).prop_map(Pick::Candidate),
        "[A-Z][a-z]{2,8}".prop_map(Pick::Invented),
    ]
}

proptest! {
    #[test]
    fn prop_result_is_exactly_the_candidates(
        titles in titles_strategy(),
        picks in prop::collection::vec((pick_strategy(), explanation_strategy()), 0..12),
        preamble in "[a-zA-Z ,!]{0,30}",
    ) {
        let candidates = candidate_set(&titles);
        let mut text = format!("{preamble}\n");
        for (i, (pick, explanation)) in picks.iter().enumerate() {
            let title = match pick {
                Pick::Candidate(n) => titles[n % titles.len()].clone(),
                Pick::Invented(t) => t.clone(),
            };
            text.push_str(&format!("{}. {} - {}\n", i + 1, title, explanation));
        }

        let rows = rerank_text(&text, &candidates);
        let known: HashSet<&str> = titles.iter().map(String::as_str).collect();
        let returned: HashSet<&str> = rows.iter().map(|(t, _)| t.as_str()).collect();

        prop_assert_eq!(rows.len(), titles.len());
        prop_assert_eq!(returned.len(), rows.len());
        prop_assert_eq!(returned, known);
    }

    #[test]
    fn prop_full_ranking_is_followed_exactly(
        ranking in titles_strategy().prop_flat_map(|t| Just(t).prop_shuffle()),
        explanation in explanation_strategy(),
    ) {
        let mut original = ranking.clone();
        original.sort();
        let candidates = candidate_set(&original);

        let text: String = ranking
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {} - {}\n", i + 1, t, explanation))
            .collect();
        let rows = rerank_text(&text, &candidates);

        prop_assert_eq!(titles_of(&rows), ranking.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert!(rows.iter().all(|(_, e)| e != DEFAULT_FALLBACK_EXPLANATION));
    }

    #[test]
    fn prop_unparseable_answer_keeps_candidate_order(
        titles in titles_strategy(),
        noise in prop::collection::vec("[a-zA-Z ,.!-]{0,40}", 0..6),
    ) {
        let candidates = candidate_set(&titles);
        let rows = rerank_text(&noise.join("\n"), &candidates);

        prop_assert_eq!(titles_of(&rows), titles.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert!(rows.iter().all(|(_, e)| e == DEFAULT_FALLBACK_EXPLANATION));
    }

    #[test]
    fn prop_resolving_is_title_unique(ids in prop::collection::vec(0u32..6, 0..20)) {
        let catalog = Arc::new(Catalog::from_items(
            (0u32..6).map(|id| CatalogItem::new(id, format!("Title {}", id % 3), "overview")),
        ));
        let candidates = CatalogResolver::new(catalog).resolve(&ids);

        let distinct: HashSet<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        prop_assert_eq!(distinct.len(), candidates.len());
        prop_assert!(candidates.len() <= ids.len());
    }
}
