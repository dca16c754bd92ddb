// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index loading: fetch the artifact once, share the outcome forever.
//!
//! The contract is deliberately strict: one fetch per process, no matter how
//! many callers ask, no matter whether it worked. Callers that arrive during
//! the fetch block until it settles; callers that arrive after get the cached
//! index or the cached error. Nothing retries. A page reload is the retry.
//!
//! The fetch itself hides behind [`ArtifactSource`] so the same loader serves
//! a site root on disk and a deployed site over HTTP, and so tests can count
//! exactly how often it runs.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::SearchError;
use crate::index::SearchIndex;

/// Index artifact location under a site's base path.
pub const INDEX_ARTIFACT: &str = "json/search-index.json";
/// Pages artifact location under a site's base path.
pub const PAGES_ARTIFACT: &str = "json/pages.json";

/// Load lifecycle of one index. `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoadState {
    Unloaded = 0,
    Loading = 1,
    Ready = 2,
    Failed = 3,
}

impl LoadState {
    pub(crate) fn from_u8(raw: u8) -> LoadState {
        match raw {
            1 => LoadState::Loading,
            2 => LoadState::Ready,
            3 => LoadState::Failed,
            _ => LoadState::Unloaded,
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoadState::Unloaded => "unloaded",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Fetches one artifact below a base path.
///
/// Errors are plain messages; callers wrap them with the base path context.
pub trait ArtifactSource: Send + Sync {
    fn fetch(&self, base_path: &str, artifact: &str) -> Result<Vec<u8>, String>;
}

/// Reads artifacts from a site root on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirSource;

impl ArtifactSource for DirSource {
    fn fetch(&self, base_path: &str, artifact: &str) -> Result<Vec<u8>, String> {
        let path = std::path::Path::new(base_path).join(artifact);
        std::fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

/// Fetches artifacts from a deployed site over HTTP.
#[cfg(feature = "http")]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| e.to_string())?;
        Ok(HttpSource { client })
    }
}

#[cfg(feature = "http")]
impl ArtifactSource for HttpSource {
    fn fetch(&self, base_path: &str, artifact: &str) -> Result<Vec<u8>, String> {
        let url = format!("{}/{}", base_path.trim_end_matches('/'), artifact);
        let resp = self.client.get(&url).send().map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("{}: HTTP {}", url, resp.status()));
        }
        let bytes = resp.bytes().map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

/// Pick a source for a base path: HTTP for `http(s)://`, the filesystem otherwise.
pub fn source_for(base_path: &str) -> Result<Arc<dyn ArtifactSource>, SearchError> {
    if base_path.starts_with("http://") || base_path.starts_with("https://") {
        #[cfg(feature = "http")]
        {
            let source = HttpSource::new().map_err(|e| SearchError::index_load(base_path, e))?;
            return Ok(Arc::new(source));
        }
        #[cfg(not(feature = "http"))]
        {
            return Err(SearchError::index_load(
                base_path,
                "built without the http feature",
            ));
        }
    }
    Ok(Arc::new(DirSource))
}

/// Loads the index artifact exactly once and caches the outcome.
///
/// The gate mutex serializes the single fetch; the state byte lets observers
/// (readiness flags, CLI status) peek without taking it. Slots are written
/// before the state flips, so a `Ready` observation always finds the index.
pub struct IndexLoader {
    source: Arc<dyn ArtifactSource>,
    base_path: String,
    state: AtomicU8,
    gate: Mutex<()>,
    index: RwLock<Option<Arc<SearchIndex>>>,
    failure: RwLock<Option<SearchError>>,
}

impl IndexLoader {
    pub fn new(source: Arc<dyn ArtifactSource>, base_path: &str) -> Self {
        IndexLoader {
            source,
            base_path: base_path.to_string(),
            state: AtomicU8::new(LoadState::Unloaded as u8),
            gate: Mutex::new(()),
            index: RwLock::new(None),
            failure: RwLock::new(None),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn state(&self) -> LoadState {
        LoadState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Ready
    }

    /// Return the loaded index, fetching it on the first call.
    ///
    /// Concurrent callers block on the gate until the first fetch settles and
    /// then share its outcome. A cached failure is returned as-is; the fetch
    /// never reruns.
    pub fn ensure_loaded(&self) -> Result<Arc<SearchIndex>, SearchError> {
        let _gate = self.gate.lock();

        if let Some(index) = self.index.read().as_ref() {
            return Ok(Arc::clone(index));
        }
        if let Some(failure) = self.failure.read().as_ref() {
            return Err(failure.clone());
        }

        self.state.store(LoadState::Loading as u8, Ordering::SeqCst);
        match self.fetch_and_parse() {
            Ok(index) => {
                let index = Arc::new(index);
                *self.index.write() = Some(Arc::clone(&index));
                self.state.store(LoadState::Ready as u8, Ordering::SeqCst);
                Ok(index)
            }
            Err(err) => {
                *self.failure.write() = Some(err.clone());
                self.state.store(LoadState::Failed as u8, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    fn fetch_and_parse(&self) -> Result<SearchIndex, SearchError> {
        let bytes = self
            .source
            .fetch(&self.base_path, INDEX_ARTIFACT)
            .map_err(|e| SearchError::index_load(&self.base_path, e))?;
        SearchIndex::from_json_slice(&bytes)
            .map_err(|e| SearchError::index_load(&self.base_path, e))
    }
}

impl std::fmt::Debug for IndexLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexLoader")
            .field("base_path", &self.base_path)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
