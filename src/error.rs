// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error type for index loading, query execution, and registry lookups.
//!
//! Every failure is local to one load or query attempt. Load failures are
//! cached by the loader and handed to every later caller unchanged, which is
//! why the type is `Clone`.

use std::fmt;

/// Error type for search failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Fetching or parsing an artifact under `base_path` failed.
    IndexLoad { base_path: String, message: String },
    /// A query could not be executed against the loaded index.
    QueryExecution { message: String },
    /// The index returned an id with no entry in the page registry.
    UnknownPage { id: String },
}

impl SearchError {
    /// Wrap a fetch/parse failure for the artifacts under `base_path`.
    pub(crate) fn index_load(base_path: &str, message: impl fmt::Display) -> Self {
        SearchError::IndexLoad {
            base_path: base_path.to_string(),
            message: message.to_string(),
        }
    }

    /// Wrap an execution failure with a plain message.
    pub(crate) fn query(message: impl fmt::Display) -> Self {
        SearchError::QueryExecution {
            message: message.to_string(),
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::IndexLoad { base_path, message } => {
                write!(f, "failed to load search index from {}: {}", base_path, message)
            }
            SearchError::QueryExecution { message } => {
                write!(f, "query execution failed: {}", message)
            }
            SearchError::UnknownPage { id } => {
                write!(f, "no page registered for id {}", id)
            }
        }
    }
}

impl std::error::Error for SearchError {}
