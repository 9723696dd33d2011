//! Comparison configuration.
//!
//! Everything that used to be a hard-coded constant of the comparison (which
//! columns are diffed, which are reported, the sort order, vacuous values and
//! ignored collection names) is carried in one [`Config`] value. The default
//! reproduces the classic catalog comparison; a TOML file can override any
//! part of it.

use crate::errors::{CatalogDiffError, ExError, ExErrorKind, Result};
use crate::model::{Attribute, ColumnKind};
use crate::report::ReportField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Captions cameras write on their own.
pub const DEFAULT_VACUOUS_CAPTIONS: &[&str] = &["", "OLYMPUS DIGITAL CAMERA", "Exif JPEG"];

/// Collections every catalog has and nobody curates.
pub const DEFAULT_IGNORED_MEMBERSHIP_NAMES: &[&str] = &["Quick Collection"];

/// A column whose value is compared across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DiffColumnRepr")]
pub struct DiffColumn {
    pub attribute: Attribute,
    pub kind: ColumnKind,
}

impl DiffColumn {
    /// Diff column using the registry-declared kind
    pub fn new(attribute: Attribute) -> Self {
        Self {
            attribute,
            kind: attribute.kind(),
        }
    }

    /// Diff column with an overridden kind
    pub fn with_kind(attribute: Attribute, kind: ColumnKind) -> Self {
        Self { attribute, kind }
    }
}

impl From<Attribute> for DiffColumn {
    fn from(attribute: Attribute) -> Self {
        DiffColumn::new(attribute)
    }
}

/// Accepts either `"RATING"` or `{ attribute = "RATING", kind = "opaque" }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DiffColumnRepr {
    Name(Attribute),
    Table {
        attribute: Attribute,
        kind: Option<ColumnKind>,
    },
}

impl From<DiffColumnRepr> for DiffColumn {
    fn from(repr: DiffColumnRepr) -> Self {
        match repr {
            DiffColumnRepr::Name(attribute) => DiffColumn::new(attribute),
            DiffColumnRepr::Table {
                attribute,
                kind: Some(kind),
            } => DiffColumn::with_kind(attribute, kind),
            DiffColumnRepr::Table {
                attribute,
                kind: None,
            } => DiffColumn::new(attribute),
        }
    }
}

/// Values of one attribute that carry no information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacuousValues {
    pub attribute: Attribute,
    pub values: BTreeSet<String>,
}

/// Comparison configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Columns compared value by value, in report order
    pub diff_columns: Vec<DiffColumn>,
    /// Image-level columns copied onto every report row
    pub report_columns: Vec<Attribute>,
    /// Lexicographic sort order of the finished report
    pub sort_columns: Vec<ReportField>,
    /// Left-side values that suppress reporting for a column
    pub vacuous_values: Vec<VacuousValues>,
    /// Collection names dropped while building a snapshot
    pub ignored_membership_names: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diff_columns: [
                Attribute::Caption,
                Attribute::GpsLocation,
                Attribute::Rating,
                Attribute::ColorLabels,
                Attribute::ParsedCaptureTime,
                Attribute::Hash,
            ]
            .into_iter()
            .map(DiffColumn::new)
            .collect(),
            report_columns: vec![
                Attribute::Filename,
                Attribute::FolderPath,
                Attribute::RootPath,
            ],
            sort_columns: vec![
                ReportField::DiffType,
                ReportField::Column(Attribute::RootPath),
                ReportField::Column(Attribute::FolderPath),
                ReportField::Column(Attribute::Filename),
            ],
            vacuous_values: vec![VacuousValues {
                attribute: Attribute::Caption,
                values: DEFAULT_VACUOUS_CAPTIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }],
            ignored_membership_names: DEFAULT_IGNORED_MEMBERSHIP_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document. Omitted keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_parse")
                .with_message(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                ExErrorKind::NotFound
            } else {
                ExErrorKind::Io
            };
            ExError::new(kind)
                .with_op("config_load")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_entity_id(path.display().to_string()))
    }

    /// Check structural invariants
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`: empty diff, report or sort column lists, duplicates,
    ///   identity or report attributes used as diff columns, membership
    ///   names used as image columns
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Result<()> {
            Err(CatalogDiffError::InvalidConfig { reason }.into())
        };

        if self.diff_columns.is_empty() {
            return invalid("diff_columns must not be empty".to_string());
        }
        if self.report_columns.is_empty() {
            return invalid("report_columns must not be empty".to_string());
        }
        if self.sort_columns.is_empty() {
            return invalid("sort_columns must not be empty".to_string());
        }

        let mut seen = BTreeSet::new();
        for column in &self.diff_columns {
            if column.attribute.is_identity() {
                return invalid(format!(
                    "{} is an identity attribute and cannot be diffed",
                    column.attribute
                ));
            }
            if !column.attribute.is_image_attribute() {
                return invalid(format!(
                    "{} is not an image attribute",
                    column.attribute
                ));
            }
            if self.report_columns.contains(&column.attribute) {
                return invalid(format!(
                    "{} is a report column and cannot be diffed",
                    column.attribute
                ));
            }
            if !seen.insert(column.attribute) {
                return invalid(format!("duplicate diff column {}", column.attribute));
            }
        }

        let mut seen = BTreeSet::new();
        for attribute in &self.report_columns {
            if !attribute.is_image_attribute() {
                return invalid(format!("{} is not an image attribute", attribute));
            }
            if !seen.insert(*attribute) {
                return invalid(format!("duplicate report column {}", attribute));
            }
        }

        let mut seen = BTreeSet::new();
        for field in &self.sort_columns {
            if !seen.insert(field.clone()) {
                return invalid(format!("duplicate sort column {}", field));
            }
        }

        Ok(())
    }

    /// Vacuous values configured for `attribute`, if any
    pub fn vacuous_set(&self, attribute: Attribute) -> Option<&BTreeSet<String>> {
        self.vacuous_values
            .iter()
            .find(|v| v.attribute == attribute)
            .map(|v| &v.values)
    }
}
