// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Worker-delegated query execution.
//!
//! Two threads and two channels. The worker thread fetches, builds, and owns
//! the index; no index data ever crosses a channel. The router thread drives
//! the handshake (answer `Ready` with `Load`), mirrors load progress into the
//! executor's state byte, and settles each pending query by its request id.
//!
//! Queries that arrive before the index is built are deferred inside the
//! worker and answered in issue order once it is. After a failed load every
//! query observes the retained load error instead of going silent.
//!
//! Shutdown is by channel closure: dropping the executor drops the last
//! request sender, the worker loop ends, its reply sender drops, and the
//! router fails whatever was still pending before exiting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::error::SearchError;
use crate::executor::{PendingQuery, QueryExecutor, QueryOutcome};
use crate::index::SearchIndex;
use crate::loader::{ArtifactSource, LoadState, INDEX_ARTIFACT};
use crate::types::RequestId;

/// Controller → worker instructions.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRequest {
    /// Fetch and build the index from this base path.
    Load { base_path: String },
    /// Run a query.
    Search { request: RequestId, text: String },
}

/// Worker → controller replies.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerReply {
    /// Worker booted, awaiting the load instruction.
    Ready,
    /// Index built; queries may be answered.
    IndexReady,
    /// Fetch or build failed; queries will fail explicitly.
    IndexFailed { message: String },
    /// Ranked ids for exactly this request.
    QueryReady {
        request: RequestId,
        ids: Vec<String>,
    },
    /// This request failed.
    QueryFailed {
        request: RequestId,
        message: String,
    },
}

/// The worker loop. Owns the index for its whole lifetime.
fn run_worker(
    source: Arc<dyn ArtifactSource>,
    requests: Receiver<WorkerRequest>,
    replies: Sender<WorkerReply>,
) {
    if replies.send(WorkerReply::Ready).is_err() {
        return;
    }

    let mut index: Option<SearchIndex> = None;
    let mut failure: Option<String> = None;
    // Queries received before the load settled, in issue order.
    let mut deferred: Vec<(RequestId, String)> = Vec::new();

    for request in requests {
        match request {
            WorkerRequest::Load { base_path } => {
                // The load happens at most once; repeats are ignored.
                if index.is_some() || failure.is_some() {
                    continue;
                }
                match fetch_and_build(source.as_ref(), &base_path) {
                    Ok(built) => {
                        index = Some(built);
                        if replies.send(WorkerReply::IndexReady).is_err() {
                            return;
                        }
                        if let Some(index) = &index {
                            for (request, text) in deferred.drain(..) {
                                let ids = index.search(&text);
                                if replies
                                    .send(WorkerReply::QueryReady { request, ids })
                                    .is_err()
                                {
                                    return;
                                }
                            }
                        }
                    }
                    Err(message) => {
                        failure = Some(message.clone());
                        let notice = WorkerReply::IndexFailed {
                            message: message.clone(),
                        };
                        if replies.send(notice).is_err() {
                            return;
                        }
                        for (request, _) in deferred.drain(..) {
                            let reply = WorkerReply::QueryFailed {
                                request,
                                message: message.clone(),
                            };
                            if replies.send(reply).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
            WorkerRequest::Search { request, text } => {
                if let Some(index) = &index {
                    let ids = index.search(&text);
                    if replies
                        .send(WorkerReply::QueryReady { request, ids })
                        .is_err()
                    {
                        return;
                    }
                } else if let Some(message) = &failure {
                    let reply = WorkerReply::QueryFailed {
                        request,
                        message: message.clone(),
                    };
                    if replies.send(reply).is_err() {
                        return;
                    }
                } else {
                    deferred.push((request, text));
                }
            }
        }
    }
}

fn fetch_and_build(source: &dyn ArtifactSource, base_path: &str) -> Result<SearchIndex, String> {
    let bytes = source.fetch(base_path, INDEX_ARTIFACT)?;
    SearchIndex::from_json_slice(&bytes).map_err(|e| e.to_string())
}

/// The router loop: handshake, state mirroring, and response correlation.
fn run_router(
    replies: Receiver<WorkerReply>,
    requests: Sender<WorkerRequest>,
    base_path: String,
    state: Arc<AtomicU8>,
    pending: Arc<Mutex<HashMap<RequestId, Sender<QueryOutcome>>>>,
) {
    // Held only until the load instruction goes out, so the request channel
    // closes once the executor is dropped.
    let mut load_channel = Some(requests);
    // Set by IndexFailed; every later query failure surfaces this one error.
    let mut load_failure: Option<String> = None;

    for reply in replies {
        match reply {
            WorkerReply::Ready => {
                state.store(LoadState::Loading as u8, Ordering::SeqCst);
                if let Some(requests) = load_channel.take() {
                    let _ = requests.send(WorkerRequest::Load {
                        base_path: base_path.clone(),
                    });
                }
            }
            WorkerReply::IndexReady => {
                state.store(LoadState::Ready as u8, Ordering::SeqCst);
            }
            WorkerReply::IndexFailed { message } => {
                load_failure = Some(message);
                state.store(LoadState::Failed as u8, Ordering::SeqCst);
            }
            WorkerReply::QueryReady { request, ids } => {
                if let Some(tx) = pending.lock().remove(&request) {
                    let _ = tx.send(Ok(ids));
                }
            }
            WorkerReply::QueryFailed { request, message } => {
                if let Some(tx) = pending.lock().remove(&request) {
                    let err = if let Some(failure) = &load_failure {
                        SearchError::index_load(&base_path, failure)
                    } else {
                        SearchError::QueryExecution { message }
                    };
                    let _ = tx.send(Err(err));
                }
            }
        }
    }

    // Worker gone; nothing will answer these.
    let mut pending = pending.lock();
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(SearchError::query("worker exited before answering")));
    }
}

/// Delegates queries to a worker thread over the message protocol.
pub struct WorkerExecutor {
    requests: Sender<WorkerRequest>,
    pending: Arc<Mutex<HashMap<RequestId, Sender<QueryOutcome>>>>,
    state: Arc<AtomicU8>,
    next_request: AtomicU64,
}

impl WorkerExecutor {
    /// Spawn the worker and router threads and begin the load handshake.
    pub fn spawn(source: Arc<dyn ArtifactSource>, base_path: &str) -> Self {
        let (request_tx, request_rx) = channel();
        let (reply_tx, reply_rx) = channel();
        let state = Arc::new(AtomicU8::new(LoadState::Unloaded as u8));
        let pending: Arc<Mutex<HashMap<RequestId, Sender<QueryOutcome>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        thread::spawn(move || run_worker(source, request_rx, reply_tx));

        {
            let requests = request_tx.clone();
            let state = Arc::clone(&state);
            let pending = Arc::clone(&pending);
            let base_path = base_path.to_string();
            thread::spawn(move || run_router(reply_rx, requests, base_path, state, pending));
        }

        WorkerExecutor {
            requests: request_tx,
            pending,
            state,
            next_request: AtomicU64::new(0),
        }
    }

    fn next_request(&self) -> RequestId {
        RequestId::new(self.next_request.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl QueryExecutor for WorkerExecutor {
    fn query(&self, text: &str) -> PendingQuery {
        let request = self.next_request();
        let (tx, pending) = PendingQuery::create(request);

        // Register before sending so the reply can never beat the bookkeeping.
        self.pending.lock().insert(request, tx);
        let sent = self.requests.send(WorkerRequest::Search {
            request,
            text: text.to_string(),
        });
        if sent.is_err() {
            if let Some(tx) = self.pending.lock().remove(&request) {
                let _ = tx.send(Err(SearchError::query("worker unavailable")));
            }
        }

        pending
    }

    fn load_state(&self) -> LoadState {
        LoadState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

impl std::fmt::Debug for WorkerExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerExecutor")
            .field("state", &self.load_state())
            .finish_non_exhaustive()
    }
}
