//! Presence changes: images that disappeared from the newer catalog.

use crate::diff::model::{DiffEntry, DiffType};
use crate::diff::{ensure_report_columns, report_values};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::merge::MergedTable;
use crate::model::{Attribute, ImageRow, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

pub const PRESENT: &str = "PRESENT";
pub const ABSENT: &str = "ABSENT";

/// Presence entries plus the per-row removal mask.
#[derive(Debug, Clone)]
pub struct PresenceDiff {
    pub entries: Vec<DiffEntry>,
    /// `removed[i]` is true when merged row `i` was reported as removed
    pub removed: Vec<bool>,
}

impl PresenceDiff {
    pub fn removed_count(&self) -> usize {
        self.removed.iter().filter(|r| **r).count()
    }
}

/// Detect removed images.
///
/// An image counts as removed when the right side carries no root-file
/// pointer, which includes the right row being absent altogether. Rows that
/// only exist on the right are never removed.
///
/// # Errors
///
/// - `MissingColumn`: either side has no `ROOT_FILE` column, so removal
///   cannot be told apart from an unloaded column
/// - `MissingReportColumn`: a report column is not on the merged table
pub fn diff_presence(
    images: &MergedTable<'_, ImageRow>,
    report_columns: &[Attribute],
) -> Result<PresenceDiff> {
    log_op_start!("diff_presence", row_count = images.len());
    let start = Instant::now();

    diff_presence_impl(images, report_columns)
        .map(|diff| {
            log_op_end!(
                "diff_presence",
                duration_ms = start.elapsed().as_millis() as u64,
                entry_count = diff.entries.len()
            );
            diff
        })
        .map_err(|e| {
            log_op_error!(
                "diff_presence",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })
}

fn diff_presence_impl(
    images: &MergedTable<'_, ImageRow>,
    report_columns: &[Attribute],
) -> Result<PresenceDiff> {
    if !images.has_column(Attribute::RootFile) {
        return Err(ExError::new(ExErrorKind::MissingColumn)
            .with_op("diff_presence")
            .with_attribute(Attribute::RootFile.name())
            .with_message("presence needs ROOT_FILE on both sides of the merged image table"));
    }
    ensure_report_columns(images, report_columns, "images")?;

    let mut entries = Vec::new();
    let mut removed = Vec::with_capacity(images.len());

    for row in images.rows() {
        let is_removed =
            row.left().is_some() && row.right_value(Attribute::RootFile).is_none();
        removed.push(is_removed);
        if !is_removed {
            continue;
        }

        let mut entry = DiffEntry::new(DiffType::Presence, row.image_id().as_str());
        entry.value_left = Some(Value::from(PRESENT));
        entry.value_right = Some(Value::from(ABSENT));
        entry.report = report_values(row, report_columns);
        entries.push(entry);
    }

    Ok(PresenceDiff { entries, removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::merge::merge_snapshots;
    use crate::model::{Snapshot, SnapshotParts};

    fn image(id: &str, filename: &str) -> ImageRow {
        ImageRow::new(id)
            .with(Attribute::RootFile, 1_i64)
            .with(Attribute::Filename, filename)
            .with(Attribute::FolderPath, "2019/")
            .with(Attribute::RootPath, "/pics/")
    }

    #[test]
    fn test_missing_right_row_is_removed() {
        let config = Config::default();
        let left = Snapshot::build(
            SnapshotParts::new("l")
                .image(image("a", "photo.jpg"))
                .image(image("b", "other.jpg")),
            &config,
        )
        .unwrap();
        let right =
            Snapshot::build(SnapshotParts::new("r").image(image("b", "other.jpg")), &config)
                .unwrap();

        let merged = merge_snapshots(&left, &right);
        let diff = diff_presence(&merged.images, &config.report_columns).unwrap();

        assert_eq!(diff.entries.len(), 1);
        assert_eq!(diff.removed, vec![true, false]);
        let entry = &diff.entries[0];
        assert_eq!(entry.value_left, Some(Value::from("PRESENT")));
        assert_eq!(entry.value_right, Some(Value::from("ABSENT")));
        assert_eq!(
            entry.report_value(Attribute::Filename),
            Some(&Value::from("photo.jpg"))
        );
    }

    #[test]
    fn test_null_root_file_is_removed() {
        let config = Config::default();
        let left =
            Snapshot::build(SnapshotParts::new("l").image(image("a", "x.jpg")), &config).unwrap();
        let mut orphan = image("a", "x.jpg");
        orphan.set(Attribute::RootFile, None);
        let right = Snapshot::build(SnapshotParts::new("r").image(orphan), &config).unwrap();

        let merged = merge_snapshots(&left, &right);
        let diff = diff_presence(&merged.images, &config.report_columns).unwrap();
        assert_eq!(diff.removed_count(), 1);
    }

    #[test]
    fn test_added_image_is_not_reported() {
        let config = Config::default();
        let left = Snapshot::build(SnapshotParts::new("l"), &config).unwrap();
        let right =
            Snapshot::build(SnapshotParts::new("r").image(image("n", "new.jpg")), &config)
                .unwrap();

        let merged = merge_snapshots(&left, &right);
        let diff = diff_presence(&merged.images, &config.report_columns).unwrap();
        assert!(diff.entries.is_empty());
        assert_eq!(diff.removed, vec![false]);
    }

    #[test]
    fn test_root_file_column_missing_is_fatal() {
        // Given a catalog loaded without the ROOT_FILE column
        let config = Config::default();
        let thin = || {
            let mut parts = SnapshotParts::new("thin").image(image("a", "x.jpg"));
            parts.image_columns.remove(&Attribute::RootFile);
            Snapshot::build(parts, &config).unwrap()
        };
        let left = thin();
        let right = thin();

        // When it is compared with itself
        let merged = merge_snapshots(&left, &right);
        let err = diff_presence(&merged.images, &config.report_columns).unwrap_err();

        // Then presence refuses instead of reporting every image removed
        assert_eq!(err.kind(), ExErrorKind::MissingColumn);
        assert_eq!(err.op(), Some("diff_presence"));
        assert_eq!(err.attribute(), Some("ROOT_FILE"));
    }
}
