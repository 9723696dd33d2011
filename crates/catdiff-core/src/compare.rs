//! Comparison entry points.
//!
//! ## Logging Ownership
//!
//! This layer owns lifecycle logging for whole comparisons:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Detectors below log their own spans; loaders log through `tracing::debug!`.

use crate::config::Config;
use crate::core_types::RunId;
use crate::diff::compute_diff;
use crate::errors::{CatalogDiffError, Result};
use crate::merge::merge_snapshots;
use crate::model::Snapshot;
use crate::report::{assemble_report, DiffReport};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Compare two snapshots, `left` being the older one.
///
/// # Errors
///
/// - `InvalidConfig`: the config does not validate
/// - `MissingReportColumn`: a report column is absent from a merged table
/// - `MissingSortColumn`: a sort column is absent from the report
pub fn compare_snapshots(left: &Snapshot, right: &Snapshot, config: &Config) -> Result<DiffReport> {
    log_op_start!(
        "compare_snapshots",
        left = left.label(),
        right = right.label()
    );
    let start = Instant::now();

    compare_snapshots_impl(left, right, config)
        .map(|report| {
            log_op_end!(
                "compare_snapshots",
                duration_ms = start.elapsed().as_millis() as u64,
                entry_count = report.len()
            );
            report
        })
        .map_err(|e| {
            log_op_error!(
                "compare_snapshots",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })
}

fn compare_snapshots_impl(left: &Snapshot, right: &Snapshot, config: &Config) -> Result<DiffReport> {
    config.validate()?;
    let merged = merge_snapshots(left, right);
    let chunks = compute_diff(&merged, config)?;
    assemble_report(chunks.into_entries(), config)
}

/// Report of one consecutive pair in a chain of snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDiff {
    /// Zero-based position of the left snapshot in the chain
    pub index: usize,
    pub left_label: String,
    pub right_label: String,
    pub report: DiffReport,
}

/// Compare each consecutive pair of a chain, oldest first.
///
/// Snapshots are pulled lazily so only two are held at a time.
///
/// # Errors
///
/// - `InvalidConfig`: the config does not validate
/// - `InvalidInput`: fewer than two snapshots
/// - any error produced by the iterator or by [`compare_snapshots`]
pub fn compare_sequence<I>(snapshots: I, config: &Config) -> Result<Vec<PairDiff>>
where
    I: IntoIterator<Item = Result<Snapshot>>,
{
    let run_id = RunId::new();
    log_op_start!("compare_sequence", run_id = run_id.as_str());
    let start = Instant::now();

    compare_sequence_impl(snapshots, config)
        .map(|pairs| {
            log_op_end!(
                "compare_sequence",
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = run_id.as_str(),
                pair_count = pairs.len()
            );
            pairs
        })
        .map_err(|e| {
            log_op_error!(
                "compare_sequence",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = run_id.as_str()
            );
            e
        })
}

fn compare_sequence_impl<I>(snapshots: I, config: &Config) -> Result<Vec<PairDiff>>
where
    I: IntoIterator<Item = Result<Snapshot>>,
{
    config.validate()?;
    let mut snapshots = snapshots.into_iter();
    let mut pairs = Vec::new();

    let Some(first) = snapshots.next() else {
        return Err(CatalogDiffError::TooFewSnapshots { count: 0 }.into());
    };
    let mut left = first?;

    for (index, next) in snapshots.enumerate() {
        let right = next?;
        let report = compare_snapshots(&left, &right, config)?;
        pairs.push(PairDiff {
            index,
            left_label: left.label().to_string(),
            right_label: right.label().to_string(),
            report,
        });
        left = right;
    }

    if pairs.is_empty() {
        return Err(CatalogDiffError::TooFewSnapshots { count: 1 }.into());
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::{Attribute, ImageRow, SnapshotParts};

    fn snapshot(label: &str, rating: i64) -> Result<Snapshot> {
        Snapshot::build(
            SnapshotParts::new(label).image(
                ImageRow::new("a")
                    .with(Attribute::RootFile, 1_i64)
                    .with(Attribute::Rating, rating),
            ),
            &Config::default(),
        )
    }

    #[test]
    fn test_sequence_compares_consecutive_pairs_only() {
        let chain = vec![snapshot("one", 1), snapshot("two", 2), snapshot("three", 3)];
        let pairs = compare_sequence(chain, &Config::default()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].left_label, "one");
        assert_eq!(pairs[0].right_label, "two");
        assert_eq!(pairs[1].index, 1);
        assert_eq!(pairs[1].left_label, "two");
        assert_eq!(pairs[1].report.len(), 1);
    }

    #[test]
    fn test_sequence_needs_two_snapshots() {
        let err = compare_sequence(vec![snapshot("one", 1)], &Config::default()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);

        let err = compare_sequence(Vec::<Result<Snapshot>>::new(), &Config::default()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_sequence_propagates_load_errors() {
        let failing: Result<Snapshot> = Err(crate::errors::ExError::new(ExErrorKind::Io));
        let err = compare_sequence(vec![snapshot("one", 1), failing], &Config::default())
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Io);
    }
}
