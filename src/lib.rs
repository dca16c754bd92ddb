//! Client-side search for static documentation sites.
//!
//! The site build publishes two JSON artifacts alongside the pages: a term
//! index with pre-scored postings and a registry describing every page. This
//! crate loads both once per session, executes queries through one of two
//! strategies, and owns the interaction state a search box needs: query text,
//! ranked results scoped to the docs version being viewed, and a selection
//! that navigation keys move through.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌───────────────┐     ┌───────────────┐
//! │   loader.rs   │────▶│  executor.rs  │────▶│   session.rs  │
//! │ (IndexLoader, │     │(QueryExecutor,│     │(SearchSession,│
//! │ArtifactSource)│     │ PendingQuery) │     │  selection)   │
//! └───────────────┘     └───────────────┘     └───────────────┘
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  index.rs / registry.rs                     │
//! │       (SearchIndex postings, PageRegistry id → page)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Execution strategies
//!
//! | Strategy                      | Where queries run              | When to pick it          |
//! |-------------------------------|--------------------------------|--------------------------|
//! | [`ExecutionStrategy::InThread`] | Calling thread, shared index | Small sites, simple embeds |
//! | [`ExecutionStrategy::Worker`]   | Worker thread, private index | Keep the caller responsive |
//!
//! Both honor the same contract: queries dispatched before the index is ready
//! are never dropped and never answered from a partial index.
//!
//! # Usage
//!
//! ```ignore
//! use talpa::{
//!     build_executor, source_for, ExecutionStrategy, PageRegistry, SearchSession,
//!     SessionConfig, PAGES_ARTIFACT,
//! };
//!
//! let source = source_for("/docs")?;
//! let registry = PageRegistry::from_json_slice(&source.fetch("/docs", PAGES_ARTIFACT)?)?;
//! let executor = build_executor(ExecutionStrategy::InThread, source, "/docs");
//!
//! let mut session = SearchSession::new(registry, executor, SessionConfig {
//!     base_path: "/docs".to_string(),
//!     version: "v1.0.0".to_string(),
//! });
//! session.set_query("install");
//! ```

// Module declarations
mod error;
mod executor;
mod index;
mod loader;
mod registry;
mod session;
pub mod testing;
mod types;
mod utils;

// Re-exports for public API
pub use error::SearchError;
pub use executor::{
    build_executor, ExecutionStrategy, LocalExecutor, PendingQuery, QueryExecutor, QueryOutcome,
    WorkerExecutor, WorkerReply, WorkerRequest,
};
pub use index::{Posting, SearchIndex};
#[cfg(feature = "http")]
pub use loader::HttpSource;
pub use loader::{
    source_for, ArtifactSource, DirSource, IndexLoader, LoadState, INDEX_ARTIFACT, PAGES_ARTIFACT,
};
pub use registry::PageRegistry;
pub use session::{SearchSession, SessionConfig, SessionState, MIN_QUERY_LEN};
pub use types::{PageEntry, RequestId};
pub use utils::normalize;
