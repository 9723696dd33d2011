//! catdiff Core - snapshot comparison and diff-report engine
//!
//! This crate provides the decision logic for comparing two versions of a
//! photo catalog:
//! - Attribute registry and typed values (`model`)
//! - Immutable catalog snapshots keyed by global image identity
//! - Full outer join of two snapshots with provenance tags (`merge`)
//! - Presence, per-column and membership change detection (`diff`)
//! - Ordered, column-typed report assembly (`report`)
//! - CSV and HTML rendering of finished reports (`render`)
//!
//! Loading snapshots from a catalog file lives in `catdiff-store`.

pub mod compare;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod render;
pub mod report;

#[doc(hidden)]
pub use catdiff_core_types as core_types;

// Re-export commonly used types
pub use compare::{compare_sequence, compare_snapshots, PairDiff};
pub use config::{Config, DiffColumn};
pub use errors::{CatalogDiffError, ExError, ExErrorKind, Result};
pub use model::{
    Attribute, ColumnKind, ImageId, ImageRow, MembershipKind, MembershipRow, Snapshot,
    SnapshotParts, Value,
};
pub use report::{DiffReport, ReportField};
