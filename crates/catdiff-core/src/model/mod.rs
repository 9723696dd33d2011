//! Catalog data model: attribute registry, typed values and snapshots.

pub mod attribute;
pub mod derive;
pub mod snapshot;
pub mod value;

pub use attribute::{Attribute, AttributeSpec, ColumnKind, Storage, ATTRIBUTES};
pub use snapshot::{
    AttributeSource, ImageId, ImageRow, ImageTable, MembershipKind, MembershipRow,
    MembershipTable, Snapshot, SnapshotParts,
};
pub use value::{format_float, GeoPoint, Value};
