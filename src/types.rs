// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a search session.
//!
//! Two things live here: the page metadata record the doc-site build emits for
//! every page, and the correlation id that ties a dispatched query to its
//! response when execution happens on another thread.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **PageEntry**: `id == path`. The registry is keyed by site path, and the
//!   index refers to pages by that same path. A build that emits differing
//!   values produces entries the index can never return.
//! - **RequestId**: allocated monotonically per executor, never reused within
//!   a process. Response matching relies on it.

use serde::{Deserialize, Serialize};

// =============================================================================
// NEWTYPES: Type-safe correlation ids
// =============================================================================

/// Type-safe query correlation id.
///
/// Prevents accidentally matching a response against the wrong pending query.
/// Executors allocate these from a monotonic counter; replies carry them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Create a RequestId from a raw counter value.
    #[inline]
    pub fn new(id: u64) -> Self {
        RequestId(id)
    }

    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        RequestId(id)
    }
}

// =============================================================================
// PAGE METADATA
// =============================================================================

/// One documentation page as the site build describes it.
///
/// Loaded once at startup from the pages artifact and never mutated. `summary_html`
/// is trusted markup straight from the build; consumers render it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    /// Registry key; equals `path`.
    pub id: String,
    pub title: String,
    /// Build-produced HTML snippet shown in result lists.
    pub summary_html: String,
    /// Site path, appended to the base path on navigation.
    pub path: String,
    /// Documentation version this page belongs to (e.g. "v1.0.0").
    pub version: String,
}
