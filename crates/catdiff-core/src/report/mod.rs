//! Report assembly.
//!
//! Concatenates detector output into one table with a stable column order
//! and sorts it by the configured sort columns.

use crate::config::Config;
use crate::diff::{Delta, DiffEntry};
use crate::errors::{CatalogDiffError, Result};
use crate::model::{Attribute, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// A column of the finished report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReportField {
    DiffType,
    ValueLeft,
    ValueRight,
    ValueDelta,
    /// A report column copied from the left image
    Column(Attribute),
}

impl ReportField {
    /// Identifier used in configuration
    pub fn name(&self) -> &'static str {
        match self {
            ReportField::DiffType => "DIFF_TYPE",
            ReportField::ValueLeft => "VALUE_LEFT",
            ReportField::ValueRight => "VALUE_RIGHT",
            ReportField::ValueDelta => "VALUE_DELTA",
            ReportField::Column(attribute) => attribute.name(),
        }
    }

    /// Header printed by renderers
    pub fn header(&self) -> &'static str {
        match self {
            ReportField::DiffType => "DIFF_TYPE",
            ReportField::ValueLeft => "value_left",
            ReportField::ValueRight => "value_right",
            ReportField::ValueDelta => "value_delta",
            ReportField::Column(attribute) => attribute.name(),
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DIFF_TYPE" => Ok(ReportField::DiffType),
            "VALUE_LEFT" => Ok(ReportField::ValueLeft),
            "VALUE_RIGHT" => Ok(ReportField::ValueRight),
            "VALUE_DELTA" => Ok(ReportField::ValueDelta),
            _ => s.parse::<Attribute>().map(ReportField::Column),
        }
    }
}

impl TryFrom<String> for ReportField {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ReportField> for String {
    fn from(field: ReportField) -> Self {
        field.name().to_string()
    }
}

/// One cell of a report row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Label(String),
    Value(Value),
    Delta(Delta),
}

impl Cell {
    fn sort_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Label(a), Cell::Label(b)) => a.cmp(b),
            (Cell::Value(a), Cell::Value(b)) => a.sort_cmp(b),
            (Cell::Delta(a), Cell::Delta(b)) => a.magnitude().total_cmp(&b.magnitude()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Label(_) => 0,
            Cell::Value(_) => 1,
            Cell::Delta(_) => 2,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Label(s) => f.write_str(s),
            Cell::Value(v) => write!(f, "{}", v),
            Cell::Delta(d) => write!(f, "{}", d),
        }
    }
}

/// Absent cells sort after present ones.
fn cmp_absent_last(a: Option<&Cell>, b: Option<&Cell>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.sort_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The finished, sorted report of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    columns: Vec<ReportField>,
    entries: Vec<DiffEntry>,
}

impl DiffReport {
    pub fn columns(&self) -> &[ReportField] {
        &self.columns
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry carries a delta
    pub fn has_delta(&self) -> bool {
        self.columns.contains(&ReportField::ValueDelta)
    }

    /// Cell of `entry` for `field`
    pub fn cell(entry: &DiffEntry, field: ReportField) -> Option<Cell> {
        match field {
            ReportField::DiffType => Some(Cell::Label(entry.diff_type.label())),
            ReportField::ValueLeft => entry.value_left.clone().map(Cell::Value),
            ReportField::ValueRight => entry.value_right.clone().map(Cell::Value),
            ReportField::ValueDelta => entry.value_delta.map(Cell::Delta),
            ReportField::Column(attribute) => {
                entry.report_value(attribute).cloned().map(Cell::Value)
            }
        }
    }

    /// Rows of cells in column order
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<Cell>>> + '_ {
        self.entries.iter().map(move |entry| {
            self.columns
                .iter()
                .map(|field| Self::cell(entry, *field))
                .collect()
        })
    }

    /// Entries of one diff type label
    pub fn entries_of<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a DiffEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.diff_type.label() == label)
    }
}

/// Assemble and sort a report.
///
/// # Errors
///
/// - `MissingSortColumn`: a sort column is not part of the assembled
///   column set
pub fn assemble_report(entries: Vec<DiffEntry>, config: &Config) -> Result<DiffReport> {
    log_op_start!("assemble_report", entry_count = entries.len());
    let start = Instant::now();

    assemble_report_impl(entries, config)
        .map(|report| {
            log_op_end!(
                "assemble_report",
                duration_ms = start.elapsed().as_millis() as u64,
                entry_count = report.len()
            );
            report
        })
        .map_err(|e| {
            log_op_error!(
                "assemble_report",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })
}

fn assemble_report_impl(mut entries: Vec<DiffEntry>, config: &Config) -> Result<DiffReport> {
    let mut columns = vec![
        ReportField::DiffType,
        ReportField::ValueLeft,
        ReportField::ValueRight,
    ];
    if entries.iter().any(|e| e.value_delta.is_some()) {
        columns.push(ReportField::ValueDelta);
    }
    columns.extend(config.report_columns.iter().copied().map(ReportField::Column));

    if let Some(missing) = config.sort_columns.iter().find(|f| !columns.contains(f)) {
        return Err(CatalogDiffError::MissingSortColumn {
            column: missing.name().to_string(),
            available: columns.iter().map(|c| c.name().to_string()).collect(),
        }
        .into());
    }

    entries.sort_by(|a, b| {
        config
            .sort_columns
            .iter()
            .map(|field| {
                cmp_absent_last(
                    DiffReport::cell(a, *field).as_ref(),
                    DiffReport::cell(b, *field).as_ref(),
                )
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    Ok(DiffReport { columns, entries })
}
