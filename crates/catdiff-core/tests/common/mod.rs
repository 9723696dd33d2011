use catdiff_core::{Attribute, Config, ImageRow, Snapshot, SnapshotParts};

/// An image with a root file and the default report columns filled in
#[allow(dead_code)]
pub fn image(id: &str, filename: &str) -> ImageRow {
    ImageRow::new(id)
        .with(Attribute::RootFile, 1_i64)
        .with(Attribute::Filename, filename)
        .with(Attribute::FolderPath, "2019/08/")
        .with(Attribute::RootPath, "/Users/me/Pictures/")
}

/// Build a snapshot with the default config
#[allow(dead_code)]
pub fn snapshot(parts: SnapshotParts) -> Snapshot {
    Snapshot::build(parts, &Config::default()).unwrap()
}

/// Single-image snapshot
#[allow(dead_code)]
pub fn single(label: &str, row: ImageRow) -> Snapshot {
    snapshot(SnapshotParts::new(label).image(row))
}
