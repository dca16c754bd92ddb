// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The page registry: id → page metadata, built once at startup.
//!
//! The doc-site build emits a pages artifact (`json/pages.json`) describing every
//! page it generated. The registry is the in-memory form of that artifact. It is
//! immutable after construction; the session maps index hits through it and drops
//! ids the build never described (stale index entries, removed pages).

use std::collections::HashMap;

use crate::error::SearchError;
use crate::types::PageEntry;

/// Immutable mapping from page id to page metadata.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: HashMap<String, PageEntry>,
}

impl PageRegistry {
    /// Build a registry from already-deserialized entries. Later duplicates win.
    pub fn from_entries(entries: Vec<PageEntry>) -> Self {
        let mut pages = HashMap::with_capacity(entries.len());
        for entry in entries {
            pages.insert(entry.id.clone(), entry);
        }
        PageRegistry { pages }
    }

    /// Parse the pages artifact (a JSON array of page entries).
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries: Vec<PageEntry> = serde_json::from_slice(bytes)?;
        Ok(PageRegistry::from_entries(entries))
    }

    /// Look up a page. A miss is not an error here; result mapping treats
    /// unknown ids as filtered out.
    pub fn get(&self, id: &str) -> Option<&PageEntry> {
        self.pages.get(id)
    }

    /// Look up a page, surfacing a miss as [`SearchError::UnknownPage`].
    pub fn require(&self, id: &str) -> Result<&PageEntry, SearchError> {
        self.pages.get(id).ok_or_else(|| SearchError::UnknownPage {
            id: id.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate over all registered pages (unordered).
    pub fn entries(&self) -> impl Iterator<Item = &PageEntry> {
        self.pages.values()
    }
}
