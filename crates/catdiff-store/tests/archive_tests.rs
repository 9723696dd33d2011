#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use catdiff_core::{Config, ExErrorKind};
use catdiff_store::archive::cache_dir_for;
use catdiff_store::{load_catalog, stage_catalog};
use common::CatalogFixture;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

fn catalog_bytes(dir: &Path) -> Vec<u8> {
    let path = dir.join("source.lrcat");
    {
        let fixture = CatalogFixture::at(&path);
        fixture.photo(1, "AAA-1", "photo.jpg", Some(5.0));
    }
    std::fs::read(path).unwrap()
}

#[test]
fn test_plain_catalog_path_passes_through() {
    let cache = TempDir::new().unwrap();
    let path = PathBuf::from("/catalogs/main.lrcat");
    assert_eq!(stage_catalog(&path, cache.path()).unwrap(), path);
}

#[test]
fn test_zipped_catalog_is_unpacked_and_loadable() {
    // GIVEN a zip holding a single catalog
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("backup.zip");
    write_zip(
        &archive,
        &[
            ("Catalog.lrcat", catalog_bytes(work.path())),
            ("notes.txt", b"weekly backup".to_vec()),
        ],
    );

    // WHEN staging it
    let staged = stage_catalog(&archive, cache.path()).unwrap();

    // THEN the catalog lands in the cache directory and loads
    assert_eq!(
        staged,
        cache_dir_for(&archive, cache.path()).join("Catalog.lrcat")
    );
    let snapshot = load_catalog(&staged, &Config::default()).unwrap();
    assert_eq!(snapshot.images().len(), 1);
}

#[test]
fn test_unpacked_archive_is_reused() {
    // GIVEN an archive staged once
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("backup.zip");
    write_zip(&archive, &[("Catalog.lrcat", b"placeholder".to_vec())]);
    let first = stage_catalog(&archive, cache.path()).unwrap();

    // WHEN the archive disappears and is staged again
    std::fs::remove_file(&archive).unwrap();
    let second = stage_catalog(&archive, cache.path()).unwrap();

    // THEN the cached copy is used
    assert_eq!(first, second);
}

#[test]
fn test_stale_empty_cache_entry_is_replaced() {
    // GIVEN a cache entry left empty by an interrupted run
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("backup.zip");
    std::fs::create_dir_all(cache_dir_for(&archive, cache.path())).unwrap();
    write_zip(&archive, &[("c.lrcat", catalog_bytes(work.path()))]);

    // WHEN staging the archive
    let staged = stage_catalog(&archive, cache.path()).unwrap();

    // THEN it is unpacked afresh and loads
    assert_eq!(staged, cache_dir_for(&archive, cache.path()).join("c.lrcat"));
    let snapshot = load_catalog(&staged, &Config::default()).unwrap();
    assert_eq!(snapshot.images().len(), 1);
}

#[test]
fn test_rejected_archive_leaves_no_cache_entry() {
    // GIVEN an archive that holds no catalog
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("empty.zip");
    write_zip(&archive, &[("readme.txt", b"nothing here".to_vec())]);

    // WHEN staging fails
    stage_catalog(&archive, cache.path()).unwrap_err();

    // THEN neither the cache entry nor the scratch directory remains
    assert!(!cache_dir_for(&archive, cache.path()).exists());
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}

#[test]
fn test_archive_without_catalog_is_rejected() {
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("empty.zip");
    write_zip(&archive, &[("readme.txt", b"nothing here".to_vec())]);

    let err = stage_catalog(&archive, cache.path()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Archive);
}

#[test]
fn test_archive_with_two_catalogs_is_rejected() {
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("double.zip");
    write_zip(
        &archive,
        &[
            ("a.lrcat", b"one".to_vec()),
            ("b.lrcat", b"two".to_vec()),
        ],
    );

    let err = stage_catalog(&archive, cache.path()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Archive);
    assert!(err.message().contains("a.lrcat"));
}

#[test]
fn test_nested_catalog_does_not_count() {
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("nested.zip");
    write_zip(&archive, &[("inner/Catalog.lrcat", b"x".to_vec())]);

    let err = stage_catalog(&archive, cache.path()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Archive);
}

#[test]
fn test_corrupt_archive_is_rejected() {
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let archive = work.path().join("broken.zip");
    std::fs::write(&archive, b"this is not a zip file").unwrap();

    let err = stage_catalog(&archive, cache.path()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Archive);
}

#[test]
fn test_missing_archive_is_not_found() {
    let work = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let err = stage_catalog(&work.path().join("gone.zip"), cache.path()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
