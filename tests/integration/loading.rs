//! Index loading from real artifacts on disk.

use std::sync::Arc;

use talpa::testing::write_site_fixture;
use talpa::{
    source_for, ArtifactSource, DirSource, IndexLoader, LoadState, SearchError, INDEX_ARTIFACT,
    PAGES_ARTIFACT,
};

use super::common::fixture_site;

#[test]
fn loads_both_artifacts_from_a_site_directory() {
    let (_dir, root) = fixture_site();
    let source = DirSource;

    let index = source.fetch(&root, INDEX_ARTIFACT).unwrap();
    let pages = source.fetch(&root, PAGES_ARTIFACT).unwrap();
    assert!(!index.is_empty());
    assert!(!pages.is_empty());
}

#[test]
fn loader_reads_a_site_once_and_serves_everyone() {
    let (_dir, root) = fixture_site();
    let source: Arc<dyn ArtifactSource> = source_for(&root).unwrap();
    let loader = Arc::new(IndexLoader::new(source, &root));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let loader = loader.clone();
            std::thread::spawn(move || loader.ensure_loaded().map(|index| index.term_count()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
    assert_eq!(loader.state(), LoadState::Ready);
}

#[test]
fn missing_site_directory_fails_and_stays_failed() {
    let dir = tempfile::tempdir().unwrap();
    let root = format!("{}/not-published", dir.path().display());
    let source = source_for(&root).unwrap();
    let loader = IndexLoader::new(source, &root);

    let first = loader.ensure_loaded();
    assert!(matches!(&first, Err(SearchError::IndexLoad { .. })));
    assert_eq!(loader.state(), LoadState::Failed);

    // Same failure again, no second attempt against the filesystem.
    let second = loader.ensure_loaded();
    assert_eq!(first.unwrap_err(), second.unwrap_err());
}

#[test]
fn corrupt_index_artifact_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_site_fixture(dir.path()).unwrap();
    std::fs::write(dir.path().join(INDEX_ARTIFACT), b"{ not json").unwrap();
    let root = dir.path().to_str().unwrap().to_string();

    let loader = IndexLoader::new(source_for(&root).unwrap(), &root);
    assert!(matches!(
        loader.ensure_loaded(),
        Err(SearchError::IndexLoad { .. })
    ));
}

#[test]
fn plain_paths_resolve_to_the_filesystem_source() {
    let (_dir, root) = fixture_site();

    // Relative-looking and absolute paths both go to disk.
    assert!(source_for(&root).is_ok());
    assert!(source_for("./site").is_ok());
}
