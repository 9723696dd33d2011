//! Diff entries and typed deltas.

use crate::model::{format_float, Attribute, MembershipKind, Value};
use std::collections::BTreeMap;
use std::fmt;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffType {
    /// The image disappeared from the newer catalog
    Presence,
    /// A diff column's value changed
    Attribute(Attribute),
    /// A keyword or collection membership was dropped
    RemovedFrom(MembershipKind),
}

impl DiffType {
    pub fn label(&self) -> String {
        match self {
            DiffType::Presence => "PRESENCE".to_string(),
            DiffType::Attribute(attribute) => attribute.name().to_string(),
            DiffType::RemovedFrom(kind) => format!("REMOVED FROM {}", kind),
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Typed difference between the right and the left value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    /// `right - left`
    Numeric(f64),
    /// Great-circle distance
    Distance { meters: f64 },
    /// One location is absent: infinitely far
    Unbounded,
    /// Elapsed time from left to right
    Duration { seconds: f64 },
}

impl Delta {
    /// Numeric magnitude used when sorting by delta
    pub fn magnitude(&self) -> f64 {
        match self {
            Delta::Numeric(v) => *v,
            Delta::Distance { meters } => *meters,
            Delta::Unbounded => f64::INFINITY,
            Delta::Duration { seconds } => *seconds,
        }
    }

    /// Same delta with left and right exchanged
    pub fn reversed(&self) -> Delta {
        match self {
            Delta::Numeric(v) => Delta::Numeric(-v),
            Delta::Duration { seconds } => Delta::Duration { seconds: -seconds },
            other => *other,
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delta::Numeric(v) => f.write_str(&format_float(*v)),
            Delta::Distance { meters } => write!(f, "{:.2} m", meters),
            Delta::Unbounded => f.write_str("inf"),
            Delta::Duration { seconds } => write!(f, "{} s", format_float(*seconds)),
        }
    }
}

/// One reported change.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    pub diff_type: DiffType,
    pub image_id: String,
    pub value_left: Option<Value>,
    pub value_right: Option<Value>,
    pub value_delta: Option<Delta>,
    /// Report column values, taken from the left side
    pub report: BTreeMap<Attribute, Value>,
}

impl DiffEntry {
    pub fn new(diff_type: DiffType, image_id: impl Into<String>) -> Self {
        Self {
            diff_type,
            image_id: image_id.into(),
            value_left: None,
            value_right: None,
            value_delta: None,
            report: BTreeMap::new(),
        }
    }

    pub fn report_value(&self, attribute: Attribute) -> Option<&Value> {
        self.report.get(&attribute)
    }
}
