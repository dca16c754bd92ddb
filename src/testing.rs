//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canned artifact sources, a scriptable executor, and an
//! on-disk site fixture.

#![doc(hidden)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::SearchError;
use crate::executor::{PendingQuery, QueryExecutor, QueryOutcome};
use crate::loader::{ArtifactSource, LoadState, INDEX_ARTIFACT, PAGES_ARTIFACT};
use crate::types::{PageEntry, RequestId};

/// Minimal index body the canned sources serve: one posting per term.
pub const FIXTURE_INDEX_JSON: &str = r#"{
  "docCount": 2,
  "terms": {
    "features": [{ "id": "/features/", "score": 3.2 }],
    "api": [{ "id": "/api/", "score": 4.0 }]
  }
}"#;

/// Fuller index for on-disk fixtures, spanning two docs versions.
pub const SITE_INDEX_JSON: &str = r#"{
  "docCount": 4,
  "terms": {
    "features": [
      { "id": "/features/", "score": 3.2 },
      { "id": "/v1.0.0-rc/features/", "score": 2.9 }
    ],
    "api": [
      { "id": "/api/", "score": 4.0 },
      { "id": "/features/", "score": 0.5 }
    ],
    "install": [{ "id": "/guides/install/", "score": 2.4 }]
  }
}"#;

/// Page registry matching [`SITE_INDEX_JSON`].
pub const SITE_PAGES_JSON: &str = r#"[
  {
    "id": "/features/",
    "title": "Features",
    "summaryHtml": "<p>What the engine can do.</p>",
    "path": "/features/",
    "version": "v1.0.0"
  },
  {
    "id": "/v1.0.0-rc/features/",
    "title": "Features (RC)",
    "summaryHtml": "<p>Release-candidate features.</p>",
    "path": "/v1.0.0-rc/features/",
    "version": "v1.0.0-rc"
  },
  {
    "id": "/api/",
    "title": "API Reference",
    "summaryHtml": "<p>Every public call.</p>",
    "path": "/api/",
    "version": "v1.0.0"
  },
  {
    "id": "/guides/install/",
    "title": "Installing",
    "summaryHtml": "<p>Getting set up.</p>",
    "path": "/guides/install/",
    "version": "v1.0.0"
  }
]"#;

/// Create a registry entry whose path doubles as its id.
///
/// This is the canonical page fixture used across all tests.
pub fn make_page(id: &str, title: &str, version: &str) -> PageEntry {
    PageEntry {
        id: id.to_string(),
        title: title.to_string(),
        summary_html: format!("<p>{}</p>", title),
        path: id.to_string(),
        version: version.to_string(),
    }
}

/// Lay down `json/search-index.json` and `json/pages.json` under `root`.
pub fn write_site_fixture(root: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(root.join("json"))?;
    std::fs::write(root.join(INDEX_ARTIFACT), SITE_INDEX_JSON)?;
    std::fs::write(root.join(PAGES_ARTIFACT), SITE_PAGES_JSON)?;
    Ok(())
}

/// Artifact source that counts fetches and always serves the same outcome.
pub struct CountingSource {
    fetches: AtomicUsize,
    outcome: Result<Vec<u8>, String>,
}

impl CountingSource {
    /// Serves [`FIXTURE_INDEX_JSON`].
    pub fn ok() -> Self {
        Self::with_bytes(Self::ok_bytes())
    }

    /// The raw bytes [`ok`](Self::ok) serves.
    pub fn ok_bytes() -> Vec<u8> {
        FIXTURE_INDEX_JSON.as_bytes().to_vec()
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        CountingSource {
            fetches: AtomicUsize::new(0),
            outcome: Ok(bytes),
        }
    }

    pub fn failing(message: &str) -> Self {
        CountingSource {
            fetches: AtomicUsize::new(0),
            outcome: Err(message.to_string()),
        }
    }

    /// How many times `fetch` has been called.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ArtifactSource for CountingSource {
    fn fetch(&self, _base_path: &str, _artifact: &str) -> Result<Vec<u8>, String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Artifact source that blocks every fetch until [`release`](Self::release).
///
/// Lets tests hold an index load open while they line up queries behind it.
pub struct GatedSource {
    bytes: Vec<u8>,
    released: Mutex<bool>,
    signal: Condvar,
}

impl GatedSource {
    pub fn holding(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(GatedSource {
            bytes,
            released: Mutex::new(false),
            signal: Condvar::new(),
        })
    }

    pub fn release(&self) {
        let mut released = self.released.lock();
        *released = true;
        self.signal.notify_all();
    }
}

impl ArtifactSource for GatedSource {
    fn fetch(&self, _base_path: &str, _artifact: &str) -> Result<Vec<u8>, String> {
        let mut released = self.released.lock();
        while !*released {
            self.signal.wait(&mut released);
        }
        Ok(self.bytes.clone())
    }
}

struct ScriptedRequest {
    request: RequestId,
    text: String,
    reply: Option<Sender<QueryOutcome>>,
}

struct ScriptInner {
    requests: Mutex<Vec<ScriptedRequest>>,
    next_request: AtomicU64,
    state: AtomicU8,
}

/// Executor double that records dispatches and settles them on command.
///
/// Clones share state, so a test can hand one clone to the session and keep
/// another for driving settlements, in any order it likes.
#[derive(Clone)]
pub struct ScriptedExecutor {
    inner: Arc<ScriptInner>,
}

impl ScriptedExecutor {
    pub fn ready() -> Self {
        Self::with_state(LoadState::Ready)
    }

    pub fn with_state(state: LoadState) -> Self {
        ScriptedExecutor {
            inner: Arc::new(ScriptInner {
                requests: Mutex::new(Vec::new()),
                next_request: AtomicU64::new(0),
                state: AtomicU8::new(state as u8),
            }),
        }
    }

    pub fn set_load_state(&self, state: LoadState) {
        self.inner.state.store(state as u8, Ordering::SeqCst);
    }

    /// Snapshot of every dispatch so far, in issue order.
    pub fn dispatched(&self) -> Vec<(RequestId, String)> {
        self.inner
            .requests
            .lock()
            .iter()
            .map(|r| (r.request, r.text.clone()))
            .collect()
    }

    /// Settle the nth dispatch with ranked ids.
    ///
    /// Panics if the dispatch does not exist or was settled already; a test
    /// driving the wrong slot should fail loudly.
    pub fn resolve_nth(&self, n: usize, ids: Vec<String>) {
        self.settle(n, Ok(ids));
    }

    /// Settle the nth dispatch with an execution failure.
    pub fn fail_nth(&self, n: usize, message: &str) {
        self.settle(n, Err(SearchError::query(message)));
    }

    fn settle(&self, n: usize, outcome: QueryOutcome) {
        let reply = {
            let mut requests = self.inner.requests.lock();
            match requests[n].reply.take() {
                Some(reply) => reply,
                None => panic!("dispatch {} was already settled", n),
            }
        };
        // The handle may have been dropped; that is the caller's business.
        let _ = reply.send(outcome);
    }
}

impl QueryExecutor for ScriptedExecutor {
    fn query(&self, text: &str) -> PendingQuery {
        let request = RequestId::new(self.inner.next_request.fetch_add(1, Ordering::SeqCst) + 1);
        let (reply, pending) = PendingQuery::create(request);
        self.inner.requests.lock().push(ScriptedRequest {
            request,
            text: text.to_string(),
            reply: Some(reply),
        });
        pending
    }

    fn load_state(&self) -> LoadState {
        LoadState::from_u8(self.inner.state.load(Ordering::SeqCst))
    }
}
