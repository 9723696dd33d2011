//! CLI diff integration tests
//!
//! These tests run the built binary against small on-disk catalogs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write_catalog(path: &Path, rating: f64) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE Adobe_images (id_local INTEGER PRIMARY KEY, id_global TEXT, rootFile INTEGER, rating REAL);
        CREATE TABLE AgLibraryFile (id_local INTEGER PRIMARY KEY, folder INTEGER, idx_filename TEXT);
        CREATE TABLE AgLibraryFolder (id_local INTEGER PRIMARY KEY, rootFolder INTEGER, pathFromRoot TEXT);
        CREATE TABLE AgLibraryRootFolder (id_local INTEGER PRIMARY KEY, absolutePath TEXT);

        INSERT INTO AgLibraryRootFolder VALUES (1, '/Users/me/Pictures/');
        INSERT INTO AgLibraryFolder VALUES (1, 1, '2019/08/');
        INSERT INTO AgLibraryFile VALUES (1, 1, 'photo.jpg');
        "#,
    )
    .unwrap();
    conn.execute(
        "INSERT INTO Adobe_images VALUES (1, 'AAA-1', 1, ?1)",
        params![rating],
    )
    .unwrap();
}

fn setup_chain(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let old = temp_dir.path().join("old.lrcat");
    let new = temp_dir.path().join("new.lrcat");
    write_catalog(&old, 4.0);
    write_catalog(&new, 3.0);
    (old, new)
}

#[test]
fn test_cli_html_report_for_two_catalogs() {
    // Scenario: two catalogs where a rating dropped
    // When: `catdiff old.lrcat new.lrcat`
    // Then: an HTML section for pair 0 lists the RATING change and the rm hint
    let temp_dir = TempDir::new().unwrap();
    let (old, new) = setup_chain(&temp_dir);

    let output = Command::new(env!("CARGO_BIN_EXE_catdiff"))
        .args([old.to_str().unwrap(), new.to_str().unwrap()])
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("<h1>Compare 0 vs 1</h1>"));
    assert!(stdout.contains("<td>RATING</td>"));
    assert!(stdout.contains("rm &quot;"));
}

#[test]
fn test_cli_csv_report() {
    let temp_dir = TempDir::new().unwrap();
    let (old, new) = setup_chain(&temp_dir);

    let output = Command::new(env!("CARGO_BIN_EXE_catdiff"))
        .args([
            old.to_str().unwrap(),
            new.to_str().unwrap(),
            "--format",
            "csv",
        ])
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert_eq!(
        lines.next(),
        Some("DIFF_TYPE,value_left,value_right,value_delta,FILENAME,FOLDER_PATH,ROOT_PATH")
    );
    assert_eq!(
        lines.next(),
        Some("RATING,4.0,3.0,-1.0,photo.jpg,2019/08/,/Users/me/Pictures/")
    );
}

#[test]
fn test_cli_missing_catalog_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let (old, _new) = setup_chain(&temp_dir);
    let missing = temp_dir.path().join("missing.lrcat");

    let output = Command::new(env!("CARGO_BIN_EXE_catdiff"))
        .args([old.to_str().unwrap(), missing.to_str().unwrap()])
        .output()
        .expect("Failed to execute CLI");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Error:"));
}

#[test]
fn test_cli_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let (old, new) = setup_chain(&temp_dir);
    let config = temp_dir.path().join("catdiff.toml");
    std::fs::write(&config, "diff_columns = []\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_catdiff"))
        .args([
            old.to_str().unwrap(),
            new.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute CLI");

    assert_eq!(output.status.code(), Some(1));
}
