//! Per-column value comparison.

use crate::config::{Config, DiffColumn};
use crate::diff::model::{Delta, DiffEntry, DiffType};
use crate::diff::{ensure_report_columns, report_values};
use crate::errors::{CatalogDiffError, Result};
use crate::merge::{MergedRow, MergedTable};
use crate::model::{ColumnKind, ImageRow, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Compare one diff column across every non-removed merged image row.
///
/// A row is ignored when its left value is absent or listed as vacuous for
/// the column. Otherwise it is reported whenever the two sides differ.
///
/// # Errors
///
/// - `MissingColumn`: the column is not on the merged image table
/// - `ColumnTypeMismatch`: a value does not fit the declared kind
/// - `MissingReportColumn`: a report column is not on the merged table
pub fn diff_column(
    images: &MergedTable<'_, ImageRow>,
    column: &DiffColumn,
    removed: &[bool],
    config: &Config,
) -> Result<Vec<DiffEntry>> {
    let attribute = column.attribute.name();
    log_op_start!("diff_column", attribute = attribute);
    let start = Instant::now();

    diff_column_impl(images, column, removed, config)
        .map(|entries| {
            log_op_end!(
                "diff_column",
                duration_ms = start.elapsed().as_millis() as u64,
                attribute = attribute,
                entry_count = entries.len()
            );
            entries
        })
        .map_err(|e| {
            log_op_error!(
                "diff_column",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                attribute = attribute
            );
            e
        })
}

fn diff_column_impl(
    images: &MergedTable<'_, ImageRow>,
    column: &DiffColumn,
    removed: &[bool],
    config: &Config,
) -> Result<Vec<DiffEntry>> {
    let attribute = column.attribute;
    if !images.has_column(attribute) {
        return Err(CatalogDiffError::MissingColumn {
            column: attribute.name().to_string(),
        }
        .into());
    }

    ensure_report_columns(images, &config.report_columns, "images")?;

    let vacuous = config.vacuous_set(attribute);
    let mut entries = Vec::new();

    for (index, row) in images.rows().iter().enumerate() {
        if removed.get(index).copied().unwrap_or(false) {
            continue;
        }

        let Some(left) = row.left_value(attribute) else {
            continue;
        };
        if let (Some(set), Value::Text(text)) = (vacuous, left) {
            if set.contains(text) {
                continue;
            }
        }

        let right = row.right_value(attribute);
        if right == Some(left) {
            continue;
        }

        let mut entry = DiffEntry::new(DiffType::Attribute(attribute), row.image_id().as_str());
        entry.value_delta = delta(column, row, left, right)?;
        entry.value_left = Some(left.clone());
        entry.value_right = right.cloned();
        entry.report = report_values(row, &config.report_columns);
        entries.push(entry);
    }

    Ok(entries)
}

fn delta(
    column: &DiffColumn,
    row: &MergedRow<'_, ImageRow>,
    left: &Value,
    right: Option<&Value>,
) -> Result<Option<Delta>> {
    let mismatch = |value: &Value, expected: &str| -> crate::errors::ExError {
        CatalogDiffError::ColumnTypeMismatch {
            column: column.attribute.name().to_string(),
            expected: expected.to_string(),
            found: value.type_name().to_string(),
            image_id: row.image_id().to_string(),
        }
        .into()
    };

    match column.kind {
        ColumnKind::Numeric => {
            let l = left.as_f64().ok_or_else(|| mismatch(left, "numeric"))?;
            let Some(right) = right else {
                return Ok(None);
            };
            let r = right.as_f64().ok_or_else(|| mismatch(right, "numeric"))?;
            Ok(Some(Delta::Numeric(r - l)))
        }
        ColumnKind::Geographic => {
            let l = left.as_location().ok_or_else(|| mismatch(left, "location"))?;
            let Some(right) = right else {
                return Ok(Some(Delta::Unbounded));
            };
            let r = right
                .as_location()
                .ok_or_else(|| mismatch(right, "location"))?;
            Ok(Some(Delta::Distance {
                meters: l.distance_meters(r),
            }))
        }
        ColumnKind::Temporal => {
            let l = left
                .as_timestamp()
                .ok_or_else(|| mismatch(left, "timestamp"))?;
            let Some(right) = right else {
                return Ok(None);
            };
            let r = right
                .as_timestamp()
                .ok_or_else(|| mismatch(right, "timestamp"))?;
            let millis = (*r - *l).num_milliseconds();
            Ok(Some(Delta::Duration {
                seconds: millis as f64 / 1000.0,
            }))
        }
        ColumnKind::Opaque => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::merge::merge_snapshots;
    use crate::model::{Attribute, Snapshot, SnapshotParts};

    fn image(id: &str) -> ImageRow {
        ImageRow::new(id)
            .with(Attribute::RootFile, 1_i64)
            .with(Attribute::Filename, "photo.jpg")
            .with(Attribute::FolderPath, "2019/")
            .with(Attribute::RootPath, "/pics/")
    }

    fn run(left: ImageRow, right: ImageRow, column: DiffColumn) -> Result<Vec<DiffEntry>> {
        let config = Config::default();
        let left = Snapshot::build(SnapshotParts::new("l").image(left), &config)?;
        let right = Snapshot::build(SnapshotParts::new("r").image(right), &config)?;
        let merged = merge_snapshots(&left, &right);
        diff_column(&merged.images, &column, &[false], &config)
    }

    #[test]
    fn test_rating_change_has_negative_delta() {
        let entries = run(
            image("a").with(Attribute::Rating, 4.0),
            image("a").with(Attribute::Rating, 3.0),
            DiffColumn::new(Attribute::Rating),
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value_delta, Some(Delta::Numeric(-1.0)));
        assert_eq!(entries[0].diff_type.to_string(), "RATING");
    }

    #[test]
    fn test_equal_integer_and_real_not_reported() {
        let entries = run(
            image("a").with(Attribute::Rating, 3_i64),
            image("a").with(Attribute::Rating, 3.0),
            DiffColumn::new(Attribute::Rating),
        )
        .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_left_absent_is_ignored() {
        let entries = run(
            image("a"),
            image("a").with(Attribute::Rating, 5_i64),
            DiffColumn::new(Attribute::Rating),
        )
        .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_right_absent_numeric_has_no_delta() {
        let entries = run(
            image("a").with(Attribute::Rating, 5_i64),
            image("a"),
            DiffColumn::new(Attribute::Rating),
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value_right, None);
        assert_eq!(entries[0].value_delta, None);
    }

    #[test]
    fn test_vacuous_caption_suppressed() {
        let entries = run(
            image("a").with(Attribute::Caption, "OLYMPUS DIGITAL CAMERA"),
            image("a").with(Attribute::Caption, "Sunset over the bay"),
            DiffColumn::new(Attribute::Caption),
        )
        .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_caption_change_reported_without_delta() {
        let entries = run(
            image("a").with(Attribute::Caption, "Sunset"),
            image("a").with(Attribute::Caption, "Sunrise"),
            DiffColumn::new(Attribute::Caption),
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value_delta, None);
    }

    #[test]
    fn test_location_removed_is_unbounded() {
        let entries = run(
            image("a")
                .with(Attribute::GpsLatitude, 48.1)
                .with(Attribute::GpsLongitude, 11.5),
            image("a"),
            DiffColumn::new(Attribute::GpsLocation),
        )
        .unwrap();
        assert_eq!(entries[0].value_delta, Some(Delta::Unbounded));
    }

    #[test]
    fn test_capture_time_shift_in_seconds() {
        let entries = run(
            image("a").with(Attribute::CaptureTime, "2019-08-10T14:33:21"),
            image("a").with(Attribute::CaptureTime, "2019-08-10T15:33:21"),
            DiffColumn::new(Attribute::ParsedCaptureTime),
        )
        .unwrap();
        assert_eq!(
            entries[0].value_delta,
            Some(Delta::Duration { seconds: 3600.0 })
        );
    }

    #[test]
    fn test_non_numeric_rating_is_type_mismatch() {
        let err = run(
            image("a").with(Attribute::Rating, "five"),
            image("a").with(Attribute::Rating, 3_i64),
            DiffColumn::new(Attribute::Rating),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ColumnTypeMismatch);
        assert_eq!(err.attribute(), Some("RATING"));
    }

    #[test]
    fn test_removed_rows_are_skipped() {
        let config = Config::default();
        let left = Snapshot::build(
            SnapshotParts::new("l").image(image("a").with(Attribute::Rating, 4_i64)),
            &config,
        )
        .unwrap();
        let right = Snapshot::build(SnapshotParts::new("r"), &config).unwrap();
        let merged = merge_snapshots(&left, &right);
        let entries = diff_column(
            &merged.images,
            &DiffColumn::new(Attribute::Rating),
            &[true],
            &config,
        )
        .unwrap();
        assert!(entries.is_empty());
    }
}
