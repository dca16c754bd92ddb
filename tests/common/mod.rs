//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::time::Duration;

use talpa::testing::write_site_fixture;
use talpa::{
    build_executor, source_for, ExecutionStrategy, PageRegistry, SearchSession, SessionConfig,
    PAGES_ARTIFACT,
};

// Re-export canonical test utilities from talpa::testing
pub use talpa::testing::{make_page, CountingSource, GatedSource, ScriptedExecutor};

// ============================================================================
// TIMING
// ============================================================================

/// Upper bound for anything asynchronous to settle in tests.
pub const SETTLE: Duration = Duration::from_secs(5);

// ============================================================================
// SITE FIXTURES
// ============================================================================

/// Write the canonical site fixture into a fresh temp dir.
///
/// Returns the TempDir (to keep it alive) and the root as a string.
pub fn fixture_site() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    write_site_fixture(dir.path()).expect("Failed to write site fixture");
    let root = dir
        .path()
        .to_str()
        .expect("temp dir path should be utf-8")
        .to_string();
    (dir, root)
}

/// Build a live session over a fixture site with the given strategy.
pub fn fixture_session(root: &str, strategy: ExecutionStrategy) -> SearchSession {
    let source = source_for(root).expect("directory roots should always have a source");
    let pages = source
        .fetch(root, PAGES_ARTIFACT)
        .expect("pages artifact should load");
    let registry = PageRegistry::from_json_slice(&pages).expect("pages artifact should parse");
    let executor = build_executor(strategy, source, root);

    SearchSession::new(
        registry,
        executor,
        SessionConfig {
            base_path: root.to_string(),
            version: "v1.0.0".to_string(),
        },
    )
}

/// Session wired to a scripted executor over the standard four-page registry.
pub fn scripted_session(executor: &ScriptedExecutor) -> SearchSession {
    let registry = PageRegistry::from_entries(vec![
        make_page("/features/", "Features", "v1.0.0"),
        make_page("/v1.0.0-rc/features/", "Features (RC)", "v1.0.0-rc"),
        make_page("/api/", "API Reference", "v1.0.0"),
        make_page("/guides/install/", "Installing", "v1.0.0"),
    ]);

    SearchSession::new(
        registry,
        Box::new(executor.clone()),
        SessionConfig {
            base_path: "/docs".to_string(),
            version: "v1.0.0".to_string(),
        },
    )
}

// ============================================================================
// INVARIANT CHECKS
// ============================================================================

/// Assert the selection invariant: `Some(i)` iff results exist and `i` is in
/// range, `None` iff there are no results.
pub fn assert_selection_well_formed(session: &SearchSession) {
    let state = session.state();
    match state.selected() {
        Some(i) => {
            assert!(
                state.has_results(),
                "INVARIANT VIOLATED: selection {} with no results",
                i
            );
            assert!(
                i < state.results().len(),
                "INVARIANT VIOLATED: selection {} >= results.len() {}",
                i,
                state.results().len()
            );
        }
        None => {
            assert!(
                !state.has_results(),
                "INVARIANT VIOLATED: results present but nothing selected"
            );
        }
    }
}

/// Assert every visible result belongs to the session's configured version.
pub fn assert_version_scoped(session: &SearchSession) {
    let version = session.config().version.clone();
    for page in session.state().results() {
        assert_eq!(
            page.version, version,
            "INVARIANT VIOLATED: result {} carries version {} in a {} session",
            page.path, page.version, version
        );
    }
}
