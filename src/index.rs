//! The search index artifact and query evaluation.
//!
//! The doc-site build serializes an inverted index to `json/search-index.json`.
//! This module owns that schema and knows how to rank pages against it. Nothing
//! else in the crate looks inside: the loader hands out `Arc<SearchIndex>` and
//! the executors only call [`SearchIndex::search`].
//!
//! # INVARIANTS
//!
//! ## RELEVANCE ORDER
//! `search` returns ids ranked by combined score, descending, with ties broken
//! by id so the ordering is stable across runs. Callers preserve this order
//! verbatim; the session filters but never re-sorts.
//!
//! ## AND SEMANTICS
//! Every query term must match. A term absent from the artifact yields an
//! empty result, not a partial one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::utils::normalize;

/// One page hit for one term, as the build emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    /// Page id (site path).
    pub id: String,
    /// Build-assigned relevance weight for this term on this page.
    pub score: f64,
}

/// The deserialized search index artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    /// Number of pages the build indexed.
    #[serde(default)]
    pub doc_count: usize,
    /// Normalized term → postings. Lists need not arrive sorted.
    pub terms: HashMap<String, Vec<Posting>>,
}

impl SearchIndex {
    /// Parse the index artifact.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Number of distinct terms in the artifact.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate a query, returning ranked page ids.
    ///
    /// The query is normalized with the same pipeline the build applied to the
    /// indexed text, split into terms, and every term must match (AND). Per
    /// term a page keeps its maximum posting score; across terms the scores
    /// sum. Ranking is by summed score, descending, ties by id.
    pub fn search(&self, query: &str) -> Vec<String> {
        let parts: Vec<String> = normalize(query)
            .split(' ')
            .filter(|p| !p.is_empty())
            .map(|s| s.to_string())
            .collect();

        if parts.is_empty() {
            return Vec::new();
        }

        // Per-term score maps; any unknown term empties the result.
        let mut score_sets: Vec<HashMap<&str, f64>> = Vec::with_capacity(parts.len());
        for part in &parts {
            let Some(postings) = self.terms.get(part.as_str()) else {
                return Vec::new();
            };
            let mut term_scores: HashMap<&str, f64> = HashMap::new();
            for posting in postings {
                term_scores
                    .entry(posting.id.as_str())
                    .and_modify(|existing| *existing = existing.max(posting.score))
                    .or_insert(posting.score);
            }
            score_sets.push(term_scores);
        }

        // Aggregate scores for pages that match all terms.
        let mut page_scores: HashMap<&str, f64> = score_sets[0].clone();
        for term_scores in &score_sets[1..] {
            page_scores.retain(|id, score| {
                if let Some(additional_score) = term_scores.get(id) {
                    *score += additional_score;
                    true
                } else {
                    false
                }
            });

            if page_scores.is_empty() {
                return Vec::new();
            }
        }

        let mut ranked: Vec<(&str, f64)> = page_scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        ranked.into_iter().map(|(id, _)| id.to_string()).collect()
    }
}
