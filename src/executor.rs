// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query execution strategies.
//!
//! One trait, two implementations, chosen once at construction: [`LocalExecutor`]
//! evaluates queries on the calling thread against a shared index; [`WorkerExecutor`]
//! ships them to a worker thread that owns its index privately and answers over
//! a channel. Either way the caller gets a [`PendingQuery`] that settles exactly
//! once with ranked page ids or an error.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::error::SearchError;
use crate::loader::{ArtifactSource, LoadState};
use crate::types::RequestId;

mod local;
mod worker;

pub use local::LocalExecutor;
pub use worker::{WorkerExecutor, WorkerReply, WorkerRequest};

/// What a settled query yields: ranked page ids, or the failure that stopped it.
pub type QueryOutcome = Result<Vec<String>, SearchError>;

/// A dispatched query waiting for its outcome.
///
/// Settles exactly once. Dropping the handle abandons the query; whoever tries
/// to answer it just finds nobody listening.
pub struct PendingQuery {
    request: RequestId,
    outcome: Receiver<QueryOutcome>,
}

impl PendingQuery {
    /// Pair a fresh handle with the sender that will settle it.
    pub(crate) fn create(request: RequestId) -> (Sender<QueryOutcome>, PendingQuery) {
        let (tx, rx) = channel();
        (
            tx,
            PendingQuery {
                request,
                outcome: rx,
            },
        )
    }

    /// Correlation id this query was dispatched with.
    pub fn request(&self) -> RequestId {
        self.request
    }

    /// Non-blocking check. `None` while the query is still in flight.
    pub fn poll(&self) -> Option<QueryOutcome> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SearchError::query(
                "executor dropped the query before answering",
            ))),
        }
    }

    /// Block until the query settles or the timeout passes.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<QueryOutcome> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(SearchError::query(
                "executor dropped the query before answering",
            ))),
        }
    }
}

impl std::fmt::Debug for PendingQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingQuery")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// A query execution strategy over one loaded index.
///
/// Queries dispatched before the index is ready are never dropped and never run
/// against a partial index; they settle once the load does, or fail explicitly
/// if the load failed.
pub trait QueryExecutor: Send {
    /// Dispatch a query. Returns a handle that settles exactly once.
    fn query(&self, text: &str) -> PendingQuery;

    /// Load lifecycle of the index this strategy queries.
    fn load_state(&self) -> LoadState;
}

/// Which execution strategy to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Evaluate on the calling thread against a shared in-process index.
    InThread,
    /// Delegate to a worker thread holding its own index.
    Worker,
}

/// Construct the chosen strategy. Both begin loading immediately.
pub fn build_executor(
    strategy: ExecutionStrategy,
    source: Arc<dyn ArtifactSource>,
    base_path: &str,
) -> Box<dyn QueryExecutor> {
    match strategy {
        ExecutionStrategy::InThread => Box::new(LocalExecutor::new(source, base_path)),
        ExecutionStrategy::Worker => Box::new(WorkerExecutor::spawn(source, base_path)),
    }
}
