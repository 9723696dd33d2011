//! Staging of zipped catalogs.
//!
//! A catalog given as a `.zip` is unpacked once into a cache directory and
//! reused on later runs. Any other path is used as is. Unpacking goes into
//! a scratch directory next to the cache entry, which is renamed into place
//! only once it holds a catalog, so an interrupted run never leaves a cache
//! entry behind that later runs would trust.

use crate::errors::{archive_error, io_error, ArchiveError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const CATALOG_EXTENSION: &str = "lrcat";

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Cache directory for an archive: the archive path with separators
/// flattened to underscores.
pub fn cache_dir_for(path: &Path, cache_root: &Path) -> PathBuf {
    let flattened = path.to_string_lossy().replace(['/', '\\'], "_");
    cache_root.join(flattened)
}

/// Resolve `path` to a catalog file, unpacking it first when it is a zip.
///
/// A cache entry without exactly one catalog is discarded and unpacked
/// again.
///
/// # Errors
///
/// - `NotFound`: the archive does not exist
/// - `Archive`: the archive is unreadable, or it does not hold exactly one
///   top-level `.lrcat`
/// - `Io`: the cache directory could not be written
pub fn stage_catalog(path: &Path, cache_root: &Path) -> Result<PathBuf> {
    if !is_zip(path) {
        return Ok(path.to_path_buf());
    }

    let dest = cache_dir_for(path, cache_root);
    if dest.exists() {
        match find_catalog(&dest) {
            Ok(catalog) => {
                tracing::debug!(archive = %path.display(), dest = %dest.display(), "reusing unpacked catalog");
                return Ok(catalog);
            }
            Err(e) => {
                tracing::warn!(dest = %dest.display(), reason = %e, "discarding incomplete unpacked catalog");
                fs::remove_dir_all(&dest).map_err(|e| io_error("stage_catalog", e))?;
            }
        }
    }

    fs::create_dir_all(cache_root).map_err(|e| io_error("stage_catalog", e))?;
    let staging = tempfile::Builder::new()
        .prefix(".unpack-")
        .tempdir_in(cache_root)
        .map_err(|e| io_error("stage_catalog", e))?;
    extract(path, staging.path())?;
    find_catalog(staging.path())?;

    // The emptied scratch path is ignored when `staging` drops.
    if let Err(e) = fs::rename(staging.path(), &dest) {
        // Another run may have finished the same archive first.
        return find_catalog(&dest).map_err(|_| io_error("stage_catalog", e));
    }

    find_catalog(&dest)
}

fn extract(path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(path)
        .map_err(|e| io_error("stage_catalog", e).with_entity_id(path.display().to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_error(path, e))?;

    tracing::info!(archive = %path.display(), dest = %dest.display(), entries = archive.len(), "unpacking catalog");

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| archive_error(path, e))?;
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            tracing::warn!(archive = %path.display(), entry = entry.name(), "unsafe entry name skipped");
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| io_error("stage_catalog", e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("stage_catalog", e))?;
        }
        let mut out = File::create(&target).map_err(|e| io_error("stage_catalog", e))?;
        io::copy(&mut entry, &mut out).map_err(|e| io_error("stage_catalog", e))?;
    }

    Ok(())
}

fn find_catalog(dir: &Path) -> Result<PathBuf> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error("stage_catalog", e))? {
        let path = entry.map_err(|e| io_error("stage_catalog", e))?.path();
        let is_catalog = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == CATALOG_EXTENSION);
        if is_catalog {
            found.push(path);
        }
    }
    found.sort();

    match found.len() {
        1 => Ok(found.remove(0)),
        _ => Err(ArchiveError::CatalogCount {
            dir: dir.display().to_string(),
            found: found.iter().map(|p| p.display().to_string()).collect(),
        }
        .into()),
    }
}
