//! Full outer join of two snapshots.
//!
//! Rows are matched on their global image id. Every row of either side
//! appears in the output exactly once per matching partner, tagged with its
//! provenance. Output order: left rows in their original order (with every
//! matching right row, in right order), then unmatched right rows in their
//! original order.

use crate::model::{
    Attribute, AttributeSource, ImageId, ImageRow, MembershipKind, MembershipRow, Snapshot,
    Value,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which side(s) a merged row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Both,
    LeftOnly,
    RightOnly,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Both => "both",
            Provenance::LeftOnly => "left_only",
            Provenance::RightOnly => "right_only",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a merged table. At least one side is always present.
#[derive(Debug)]
pub struct MergedRow<'a, T> {
    left: Option<&'a T>,
    right: Option<&'a T>,
}

impl<T> Clone for MergedRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MergedRow<'_, T> {}

impl<'a, T: AttributeSource> MergedRow<'a, T> {
    pub fn both(left: &'a T, right: &'a T) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn left_only(left: &'a T) -> Self {
        Self {
            left: Some(left),
            right: None,
        }
    }

    pub fn right_only(right: &'a T) -> Self {
        Self {
            left: None,
            right: Some(right),
        }
    }

    pub fn left(&self) -> Option<&'a T> {
        self.left
    }

    pub fn right(&self) -> Option<&'a T> {
        self.right
    }

    pub fn provenance(&self) -> Provenance {
        match (self.left.is_some(), self.right.is_some()) {
            (true, true) => Provenance::Both,
            (true, false) => Provenance::LeftOnly,
            (false, _) => Provenance::RightOnly,
        }
    }

    /// Global id shared by both sides
    pub fn image_id(&self) -> &'a ImageId {
        match (self.left, self.right) {
            (Some(row), _) | (None, Some(row)) => row.image_id(),
            (None, None) => unreachable!("constructors always set one side"),
        }
    }

    pub fn left_value(&self, attribute: Attribute) -> Option<&'a Value> {
        self.left.and_then(|row| row.get(attribute))
    }

    pub fn right_value(&self, attribute: Attribute) -> Option<&'a Value> {
        self.right.and_then(|row| row.get(attribute))
    }

    /// Value from the left side, falling back to the right
    pub fn value(&self, attribute: Attribute) -> Option<&'a Value> {
        self.left_value(attribute)
            .or_else(|| self.right_value(attribute))
    }
}

/// A merged table plus the columns each side declared.
#[derive(Debug, Clone)]
pub struct MergedTable<'a, T> {
    left_columns: &'a BTreeSet<Attribute>,
    right_columns: &'a BTreeSet<Attribute>,
    rows: Vec<MergedRow<'a, T>>,
}

impl<'a, T: AttributeSource> MergedTable<'a, T> {
    /// A column is present on the merge only when both sides carry it.
    pub fn has_column(&self, attribute: Attribute) -> bool {
        self.left_columns.contains(&attribute) && self.right_columns.contains(&attribute)
    }

    pub fn rows(&self) -> &[MergedRow<'a, T>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows per provenance tag
    pub fn provenance_counts(&self) -> (usize, usize, usize) {
        self.rows
            .iter()
            .fold((0, 0, 0), |(both, left, right), row| match row.provenance() {
                Provenance::Both => (both + 1, left, right),
                Provenance::LeftOnly => (both, left + 1, right),
                Provenance::RightOnly => (both, left, right + 1),
            })
    }
}

/// Full outer join of `left` and `right` on `key`.
pub fn outer_join<'a, T, K, F>(left: &'a [T], right: &'a [T], key: F) -> Vec<MergedRow<'a, T>>
where
    T: AttributeSource,
    K: Ord,
    F: Fn(&'a T) -> K,
{
    let mut right_index: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (position, row) in right.iter().enumerate() {
        right_index.entry(key(row)).or_default().push(position);
    }

    let mut matched = vec![false; right.len()];
    let mut rows = Vec::with_capacity(left.len().max(right.len()));

    for row in left {
        match right_index.get(&key(row)) {
            Some(positions) => {
                for &position in positions {
                    matched[position] = true;
                    rows.push(MergedRow::both(row, &right[position]));
                }
            }
            None => rows.push(MergedRow::left_only(row)),
        }
    }

    for (position, row) in right.iter().enumerate() {
        if !matched[position] {
            rows.push(MergedRow::right_only(row));
        }
    }

    rows
}

/// The three merged tables of a snapshot pair.
#[derive(Debug, Clone)]
pub struct MergedSnapshots<'a> {
    pub images: MergedTable<'a, ImageRow>,
    pub keywords: MergedTable<'a, MembershipRow>,
    pub collections: MergedTable<'a, MembershipRow>,
}

impl<'a> MergedSnapshots<'a> {
    pub fn memberships(&self, kind: MembershipKind) -> &MergedTable<'a, MembershipRow> {
        match kind {
            MembershipKind::Keyword => &self.keywords,
            MembershipKind::Collection => &self.collections,
        }
    }
}

/// Merge two snapshots table by table.
///
/// Images join on the global id; membership tables join on
/// `(global id, name)`.
pub fn merge_snapshots<'a>(left: &'a Snapshot, right: &'a Snapshot) -> MergedSnapshots<'a> {
    let images = MergedTable {
        left_columns: left.images().columns(),
        right_columns: right.images().columns(),
        rows: outer_join(left.images().rows(), right.images().rows(), |row| {
            &row.image_id
        }),
    };

    let merge_memberships = |kind: MembershipKind| {
        let l = left.memberships(kind);
        let r = right.memberships(kind);
        MergedTable {
            left_columns: l.columns(),
            right_columns: r.columns(),
            rows: outer_join(l.rows(), r.rows(), |row: &'a MembershipRow| {
                (&row.image_id, row.name.as_str())
            }),
        }
    };

    let merged = MergedSnapshots {
        images,
        keywords: merge_memberships(MembershipKind::Keyword),
        collections: merge_memberships(MembershipKind::Collection),
    };

    let (both, left_only, right_only) = merged.images.provenance_counts();
    tracing::debug!(
        left = left.label(),
        right = right.label(),
        both,
        left_only,
        right_only,
        "images merged"
    );

    merged
}
