//! catdiff Store - reading catalog snapshots from disk
//!
//! Provides:
//! - Read-only SQLite connections to catalog files
//! - Snapshot loading from the catalog schema
//! - Staging of zipped catalogs into a cache directory

pub mod archive;
pub mod db;
pub mod errors;
pub mod loader;

// Re-export key types
pub use archive::stage_catalog;
pub use errors::Result;
pub use loader::{load_catalog, load_catalog_from_connection};
