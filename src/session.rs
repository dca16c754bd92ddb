// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The search session: query text, results, selection, and the rules that
//! keep them honest.
//!
//! The session owns all interaction state and is the only writer. Results
//! arrive asynchronously, so every dispatched search is stamped with a
//! generation token; a settlement is applied only while its token is still
//! current. Whatever order responses arrive in, state reflects the last
//! issued query.
//!
//! # INVARIANTS
//!
//! ## SELECTION
//! `selected` is `Some(i)` iff `results` is non-empty, and `i < results.len()`.
//! `has_results()` derives from `results` and is never stored.
//!
//! ## VERSION SCOPE
//! Every applied result carries the version requested at dispatch time. A
//! version switch mid-flight cannot mix scopes.

use std::time::{Duration, Instant};

use crate::error::SearchError;
use crate::executor::{PendingQuery, QueryExecutor, QueryOutcome};
use crate::loader::LoadState;
use crate::registry::PageRegistry;
use crate::types::PageEntry;

/// Queries shorter than this never reach the executor.
pub const MIN_QUERY_LEN: usize = 2;

/// Where the session lives and which docs version it scopes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Site root prepended to page paths on submit.
    pub base_path: String,
    /// Documentation version currently being viewed.
    pub version: String,
}

/// Interaction state owned by the session.
///
/// Fields are private so the selection invariant survives; transitions go
/// through [`SearchSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    query: String,
    results: Vec<PageEntry>,
    selected: Option<usize>,
}

impl SessionState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[PageEntry] {
        &self.results
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn selected_entry(&self) -> Option<&PageEntry> {
        self.selected.and_then(|i| self.results.get(i))
    }
}

/// One dispatched search awaiting settlement.
struct InFlight {
    generation: u64,
    version: String,
    pending: PendingQuery,
}

/// Drives queries, applies settlements, and exposes the interaction state.
pub struct SearchSession {
    registry: PageRegistry,
    executor: Box<dyn QueryExecutor>,
    config: SessionConfig,
    state: SessionState,
    generation: u64,
    in_flight: Vec<InFlight>,
    last_error: Option<SearchError>,
}

impl SearchSession {
    pub fn new(
        registry: PageRegistry,
        executor: Box<dyn QueryExecutor>,
        config: SessionConfig,
    ) -> Self {
        SearchSession {
            registry,
            executor,
            config,
            state: SessionState::default(),
            generation: 0,
            in_flight: Vec::new(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn load_state(&self) -> LoadState {
        self.executor.load_state()
    }

    pub fn is_ready(&self) -> bool {
        self.load_state() == LoadState::Ready
    }

    /// Error from the most recent applied settlement, if it failed.
    pub fn last_error(&self) -> Option<&SearchError> {
        self.last_error.as_ref()
    }

    /// Store the query text and either dispatch a search or clear results.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] characters clear result state
    /// and invalidate whatever is still in flight, so a superseded dispatch
    /// settling late cannot repopulate the cleared list. The text itself is
    /// kept, so a third keystroke picks up where typing left off.
    pub fn set_query(&mut self, text: &str) {
        self.state.query = text.to_string();
        if text.chars().count() >= MIN_QUERY_LEN {
            let version = self.config.version.clone();
            self.run_search(&version);
        } else {
            self.generation += 1;
            self.in_flight.clear();
            self.clear_results();
        }
    }

    /// Dispatch the current query text, scoped to `version`.
    ///
    /// Stamps a fresh generation token; earlier dispatches still in flight
    /// become stale and their settlements will be discarded.
    pub fn run_search(&mut self, version: &str) {
        self.generation += 1;
        let pending = self.executor.query(&self.state.query);
        self.in_flight.push(InFlight {
            generation: self.generation,
            version: version.to_string(),
            pending,
        });
    }

    /// Apply every settled search without blocking.
    ///
    /// Returns true if any settlement was applied to state.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let mut i = 0;
        while i < self.in_flight.len() {
            match self.in_flight[i].pending.poll() {
                Some(outcome) => {
                    let entry = self.in_flight.remove(i);
                    if entry.generation == self.generation {
                        self.apply_outcome(outcome, &entry.version);
                        changed = true;
                    }
                }
                None => i += 1,
            }
        }
        changed
    }

    /// Block until every in-flight search settles or the deadline passes.
    ///
    /// Returns true if nothing is left in flight.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.poll();
                return self.in_flight.is_empty();
            }
            match self.in_flight[0].pending.wait_timeout(remaining) {
                Some(outcome) => {
                    let entry = self.in_flight.remove(0);
                    if entry.generation == self.generation {
                        self.apply_outcome(outcome, &entry.version);
                    }
                }
                None => return false,
            }
        }
        true
    }

    /// Move the selection toward the end of the list. Clamps, never wraps.
    pub fn move_selection_down(&mut self) {
        if let Some(selected) = self.state.selected {
            let last = self.state.results.len() - 1;
            self.state.selected = Some((selected + 1).min(last));
        }
    }

    /// Move the selection toward the start of the list. Clamps, never wraps.
    pub fn move_selection_up(&mut self) {
        if let Some(selected) = self.state.selected {
            self.state.selected = Some(selected.saturating_sub(1));
        }
    }

    /// Navigation target for the selected result, if any.
    ///
    /// Plain concatenation of the base path and the page path; the caller
    /// performs the navigation. Does not mutate session state.
    pub fn submit(&self) -> Option<String> {
        self.state
            .selected_entry()
            .map(|entry| format!("{}{}", self.config.base_path, entry.path))
    }

    /// Clear query text and all result state; in-flight searches are abandoned.
    pub fn reset(&mut self) {
        self.state.query.clear();
        self.clear_results();
        self.generation += 1;
        self.in_flight.clear();
        self.last_error = None;
    }

    fn clear_results(&mut self) {
        self.state.results.clear();
        self.state.selected = None;
    }

    fn apply_outcome(&mut self, outcome: QueryOutcome, version: &str) {
        match outcome {
            Ok(ids) => {
                let entries: Vec<PageEntry> = ids
                    .iter()
                    .filter_map(|id| self.registry.get(id))
                    .filter(|page| page.version == version)
                    .cloned()
                    .collect();
                if entries.is_empty() {
                    self.clear_results();
                } else {
                    self.state.results = entries;
                    self.state.selected = Some(0);
                }
                self.last_error = None;
            }
            Err(err) => {
                self.clear_results();
                self.last_error = Some(err);
            }
        }
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("query", &self.state.query)
            .field("results", &self.state.results.len())
            .field("selected", &self.state.selected)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
