//! Keyword and collection membership removals.

use crate::diff::model::{DiffEntry, DiffType};
use crate::diff::{ensure_report_columns, report_values};
use crate::errors::Result;
use crate::merge::{MergedTable, Provenance};
use crate::model::{Attribute, MembershipKind, MembershipRow, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Report memberships present on the left and gone on the right.
///
/// Added memberships are never reported.
///
/// # Errors
///
/// - `MissingReportColumn`: a report column is not on the merged table
pub fn diff_memberships(
    table: &MergedTable<'_, MembershipRow>,
    kind: MembershipKind,
    report_columns: &[Attribute],
) -> Result<Vec<DiffEntry>> {
    log_op_start!("diff_memberships", kind = kind.table_name());
    let start = Instant::now();

    diff_memberships_impl(table, kind, report_columns)
        .map(|entries| {
            log_op_end!(
                "diff_memberships",
                duration_ms = start.elapsed().as_millis() as u64,
                kind = kind.table_name(),
                entry_count = entries.len()
            );
            entries
        })
        .map_err(|e| {
            log_op_error!(
                "diff_memberships",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                kind = kind.table_name()
            );
            e
        })
}

fn diff_memberships_impl(
    table: &MergedTable<'_, MembershipRow>,
    kind: MembershipKind,
    report_columns: &[Attribute],
) -> Result<Vec<DiffEntry>> {
    ensure_report_columns(table, report_columns, kind.table_name())?;

    let mut entries = Vec::new();
    for row in table.rows() {
        if row.provenance() != Provenance::LeftOnly {
            continue;
        }
        let Some(left) = row.left() else {
            continue;
        };

        let mut entry = DiffEntry::new(DiffType::RemovedFrom(kind), row.image_id().as_str());
        entry.value_left = Some(Value::from(left.name.as_str()));
        entry.report = report_values(row, report_columns);
        entries.push(entry);
    }
    Ok(entries)
}
