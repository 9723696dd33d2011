//! Change detection over merged snapshots.
//!
//! Three detectors run over a [`MergedSnapshots`]: presence, one pass per
//! configured diff column, and membership removal. Structural failures that
//! only concern one diff column are logged and skip that column; every
//! other error aborts the comparison.

pub mod column;
pub mod membership;
pub mod model;
pub mod presence;

pub use column::diff_column;
pub use membership::diff_memberships;
pub use model::{Delta, DiffEntry, DiffType};
pub use presence::{diff_presence, PresenceDiff};

use crate::config::Config;
use crate::errors::{CatalogDiffError, Result};
use crate::merge::{MergedRow, MergedSnapshots, MergedTable};
use crate::model::{Attribute, AttributeSource, MembershipKind, Value};
use std::collections::BTreeMap;

/// Entries of one comparison, grouped by detector in report order.
#[derive(Debug, Clone, Default)]
pub struct DiffChunks {
    pub presence: Vec<DiffEntry>,
    pub columns: Vec<Vec<DiffEntry>>,
    pub keywords: Vec<DiffEntry>,
    pub collections: Vec<DiffEntry>,
    /// Diff columns skipped because of a column-local failure
    pub skipped_columns: Vec<Attribute>,
}

impl DiffChunks {
    /// All entries in detector order
    pub fn into_entries(self) -> Vec<DiffEntry> {
        let mut entries = self.presence;
        entries.extend(self.columns.into_iter().flatten());
        entries.extend(self.keywords);
        entries.extend(self.collections);
        entries
    }
}

/// Run every detector over a merged snapshot pair.
pub fn compute_diff(merged: &MergedSnapshots<'_>, config: &Config) -> Result<DiffChunks> {
    let presence = diff_presence(&merged.images, &config.report_columns)?;

    let mut columns = Vec::with_capacity(config.diff_columns.len());
    let mut skipped_columns = Vec::new();
    for column in &config.diff_columns {
        match diff_column(&merged.images, column, &presence.removed, config) {
            Ok(entries) => columns.push(entries),
            Err(e) if e.kind().is_column_local() => {
                tracing::warn!(
                    op = "diff_column",
                    attribute = column.attribute.name(),
                    err.code = e.code(),
                    error = %e,
                    "diff column skipped"
                );
                skipped_columns.push(column.attribute);
            }
            Err(e) => return Err(e),
        }
    }

    let keywords = diff_memberships(
        merged.memberships(MembershipKind::Keyword),
        MembershipKind::Keyword,
        &config.report_columns,
    )?;
    let collections = diff_memberships(
        merged.memberships(MembershipKind::Collection),
        MembershipKind::Collection,
        &config.report_columns,
    )?;

    Ok(DiffChunks {
        presence: presence.entries,
        columns,
        keywords,
        collections,
        skipped_columns,
    })
}

/// Check that `table` carries every report column.
///
/// # Errors
///
/// - `MissingReportColumn`: the first column `table` does not carry
pub(crate) fn ensure_report_columns<T: AttributeSource>(
    table: &MergedTable<'_, T>,
    columns: &[Attribute],
    table_name: &str,
) -> Result<()> {
    match columns.iter().find(|a| !table.has_column(**a)) {
        Some(attribute) => Err(CatalogDiffError::MissingReportColumn {
            table: table_name.to_string(),
            column: attribute.name().to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Report column values of a merged row, taken from the left side.
pub(crate) fn report_values<T: AttributeSource>(
    row: &MergedRow<'_, T>,
    columns: &[Attribute],
) -> BTreeMap<Attribute, Value> {
    columns
        .iter()
        .filter_map(|a| row.left_value(*a).map(|v| (*a, v.clone())))
        .collect()
}
