//! Reconciliation - generator output checked against the candidate set
//!
//! ## Algorithm
//! 1. Deduplicate parsed titles, first occurrence wins
//! 2. Drop titles that are not candidates (hallucination firewall)
//! 3. Append every candidate the generator skipped, in candidate order,
//!    with the fallback explanation
//!
//! Whatever the generator wrote, the output holds every candidate title
//! exactly once and nothing else. A repeated candidate title keeps its
//! first row.

use crate::types::{CandidateSet, RankedExplanation, Recommendation};
use data_loader::CatalogItem;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// What happened to the parsed lines of one answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub parsed: usize,
    pub accepted: usize,
    pub duplicates: usize,
    /// Titles that are not candidates
    pub rejected: usize,
    pub backfilled: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub recommendations: Vec<Recommendation>,
    pub stats: ReconcileStats,
}

pub fn reconcile(
    parsed: Vec<RankedExplanation>,
    candidates: &CandidateSet,
    fallback_explanation: &str,
) -> Reconciliation {
    let mut by_title: HashMap<&str, &CatalogItem> = HashMap::with_capacity(candidates.len());
    for item in candidates {
        by_title.entry(item.title.as_str()).or_insert(item.as_ref());
    }

    let mut stats = ReconcileStats {
        parsed: parsed.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::with_capacity(parsed.len());
    let mut recommendations = Vec::with_capacity(candidates.len());

    for line in parsed {
        if !seen.insert(line.title.clone()) {
            stats.duplicates += 1;
            continue;
        }
        match by_title.get(line.title.as_str()) {
            Some(item) => {
                recommendations.push(Recommendation::from_item(item, line.explanation, false));
                stats.accepted += 1;
            }
            None => {
                warn!("Discarding title '{}' that is not a candidate", line.title);
                stats.rejected += 1;
            }
        }
    }

    // Titles are unique in the output even if the candidates repeat one
    for item in candidates {
        if seen.insert(item.title.clone()) {
            recommendations.push(Recommendation::from_item(item, fallback_explanation, true));
            stats.backfilled += 1;
        }
    }

    debug!(?stats, "Reconciled generator output");
    Reconciliation {
        recommendations,
        stats,
    }
}
