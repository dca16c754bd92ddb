//! In-thread query execution against a shared in-process index.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::executor::{PendingQuery, QueryExecutor};
use crate::loader::{ArtifactSource, IndexLoader, LoadState};
use crate::types::RequestId;

/// Evaluates queries synchronously; every returned handle is already settled.
///
/// The index load starts in the background at construction. A query that
/// arrives mid-load blocks on the loader's gate until the outcome settles,
/// then proceeds against the full index or reports the cached failure.
pub struct LocalExecutor {
    loader: Arc<IndexLoader>,
    next_request: AtomicU64,
}

impl LocalExecutor {
    pub fn new(source: Arc<dyn ArtifactSource>, base_path: &str) -> Self {
        let loader = Arc::new(IndexLoader::new(source, base_path));

        let prefetch = Arc::clone(&loader);
        std::thread::spawn(move || {
            let _ = prefetch.ensure_loaded();
        });

        LocalExecutor {
            loader,
            next_request: AtomicU64::new(0),
        }
    }

    fn next_request(&self) -> RequestId {
        RequestId::new(self.next_request.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl QueryExecutor for LocalExecutor {
    fn query(&self, text: &str) -> PendingQuery {
        let (tx, pending) = PendingQuery::create(self.next_request());
        let outcome = self
            .loader
            .ensure_loaded()
            .map(|index| index.search(text));
        let _ = tx.send(outcome);
        pending
    }

    fn load_state(&self) -> LoadState {
        self.loader.state()
    }
}
