//! Interaction scenarios: the sequences a search box actually goes through.

use talpa::{
    build_executor, source_for, ExecutionStrategy, LoadState, PageRegistry, SearchError,
    SearchSession, SessionConfig, PAGES_ARTIFACT,
};

use super::common::{
    assert_selection_well_formed, assert_version_scoped, fixture_session, fixture_site,
    scripted_session, ScriptedExecutor, SETTLE,
};

#[test]
fn typing_flow_ends_on_the_last_query() {
    let (_dir, root) = fixture_site();
    let mut session = fixture_session(&root, ExecutionStrategy::InThread);

    // One character stays below the gate; nothing runs.
    session.set_query("i");
    assert!(!session.state().has_results());

    // Each further keystroke re-dispatches; the final text decides the state.
    session.set_query("in");
    session.set_query("ins");
    session.set_query("install");
    assert!(session.wait_idle(SETTLE));

    let state = session.state();
    assert_eq!(state.query(), "install");
    assert_eq!(state.results().len(), 1);
    assert_eq!(state.results()[0].path, "/guides/install/");
    assert_selection_well_formed(&session);
    assert_version_scoped(&session);
}

#[test]
fn each_version_sees_its_own_features_page() {
    let (_dir, root) = fixture_site();

    let mut stable = fixture_session(&root, ExecutionStrategy::InThread);
    stable.set_query("features");
    assert!(stable.wait_idle(SETTLE));
    let stable_paths: Vec<&str> = stable
        .state()
        .results()
        .iter()
        .map(|p| p.path.as_str())
        .collect();
    assert_eq!(stable_paths, vec!["/features/"]);

    let source = source_for(&root).unwrap();
    let pages = source.fetch(&root, PAGES_ARTIFACT).unwrap();
    let registry = PageRegistry::from_json_slice(&pages).unwrap();
    let executor = build_executor(ExecutionStrategy::InThread, source, &root);
    let mut rc = SearchSession::new(
        registry,
        executor,
        SessionConfig {
            base_path: root.clone(),
            version: "v1.0.0-rc".to_string(),
        },
    );
    rc.set_query("features");
    assert!(rc.wait_idle(SETTLE));
    let rc_paths: Vec<&str> = rc
        .state()
        .results()
        .iter()
        .map(|p| p.path.as_str())
        .collect();
    assert_eq!(rc_paths, vec!["/v1.0.0-rc/features/"]);
    assert_version_scoped(&rc);
}

#[test]
fn submit_joins_base_path_and_page_path_verbatim() {
    let executor = ScriptedExecutor::ready();
    let mut session = scripted_session(&executor);

    session.set_query("api");
    executor.resolve_nth(0, vec!["/api/".to_string()]);
    session.poll();

    assert_eq!(session.submit(), Some("/docs/api/".to_string()));
}

#[test]
fn latest_query_wins_under_any_settlement_order() {
    let executor = ScriptedExecutor::ready();
    let mut session = scripted_session(&executor);

    session.set_query("features");
    session.set_query("install something");

    // Settle newest first, stale second.
    executor.resolve_nth(1, vec!["/guides/install/".to_string()]);
    session.poll();
    executor.resolve_nth(0, vec!["/features/".to_string()]);
    session.poll();

    assert_eq!(session.state().results()[0].path, "/guides/install/");
    assert_selection_well_formed(&session);
}

#[test]
fn selection_walk_stays_inside_the_list() {
    let executor = ScriptedExecutor::ready();
    let mut session = scripted_session(&executor);

    session.set_query("everything");
    executor.resolve_nth(
        0,
        vec![
            "/features/".to_string(),
            "/api/".to_string(),
            "/guides/install/".to_string(),
        ],
    );
    session.poll();

    for _ in 0..5 {
        session.move_selection_down();
        assert_selection_well_formed(&session);
    }
    assert_eq!(session.state().selected(), Some(2));
    assert_eq!(session.submit(), Some("/docs/guides/install/".to_string()));

    for _ in 0..5 {
        session.move_selection_up();
        assert_selection_well_formed(&session);
    }
    assert_eq!(session.state().selected(), Some(0));
}

#[test]
fn unknown_index_ids_never_break_a_search() {
    let executor = ScriptedExecutor::ready();
    let mut session = scripted_session(&executor);

    session.set_query("features");
    executor.resolve_nth(
        0,
        vec![
            "/removed-page/".to_string(),
            "/features/".to_string(),
        ],
    );
    session.poll();

    assert_eq!(session.state().results().len(), 1);
    assert_eq!(session.state().results()[0].path, "/features/");
    assert!(session.last_error().is_none());
}

#[test]
fn reset_returns_the_session_to_idle() {
    let (_dir, root) = fixture_site();
    let mut session = fixture_session(&root, ExecutionStrategy::InThread);

    session.set_query("features");
    assert!(session.wait_idle(SETTLE));
    assert!(session.state().has_results());

    session.reset();
    assert_eq!(session.state().query(), "");
    assert!(!session.state().has_results());
    assert_selection_well_formed(&session);
}

#[test]
fn worker_sessions_surface_load_failures() {
    let dir = tempfile::tempdir().unwrap();
    let root = format!("{}/never-published", dir.path().display());

    let source = source_for(&root).unwrap();
    let executor = build_executor(ExecutionStrategy::Worker, source, &root);
    let mut session = SearchSession::new(
        PageRegistry::default(),
        executor,
        SessionConfig {
            base_path: root,
            version: "v1.0.0".to_string(),
        },
    );

    session.set_query("anything");
    assert!(session.wait_idle(SETTLE));
    assert!(!session.state().has_results());
    assert!(matches!(
        session.last_error(),
        Some(SearchError::IndexLoad { .. })
    ));
    assert_eq!(session.load_state(), LoadState::Failed);
}
