//! Immutable catalog snapshots.
//!
//! A [`Snapshot`] is built once from the rows a loader produced and never
//! mutated afterwards. Building derives computed attributes, denormalizes
//! report columns onto membership rows, drops ignored collections and
//! enforces that every image id is unique.

use crate::config::Config;
use crate::errors::{CatalogDiffError, Result};
use crate::model::attribute::Attribute;
use crate::model::derive::{compose_file_link, compose_location, parse_capture_time};
use crate::model::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Stable global image identity.
///
/// Row-local integer ids are not comparable across independently generated
/// catalogs; this is the catalog's global id string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Read access to a row's attribute values.
pub trait AttributeSource {
    fn image_id(&self) -> &ImageId;
    fn get(&self, attribute: Attribute) -> Option<&Value>;
}

/// One image with its scalar attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    pub image_id: ImageId,
    values: BTreeMap<Attribute, Value>,
}

impl ImageRow {
    pub fn new(image_id: impl Into<ImageId>) -> Self {
        Self {
            image_id: image_id.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.values.insert(attribute, value.into());
        self
    }

    /// Set or clear an attribute
    pub fn set(&mut self, attribute: Attribute, value: Option<Value>) {
        match value {
            Some(v) => {
                self.values.insert(attribute, v);
            }
            None => {
                self.values.remove(&attribute);
            }
        }
    }

    pub fn values(&self) -> impl Iterator<Item = (Attribute, &Value)> {
        self.values.iter().map(|(a, v)| (*a, v))
    }

    fn derive_attributes(&mut self) {
        let parsed = match self.values.get(&Attribute::CaptureTime) {
            Some(Value::Timestamp(t)) => Some(Value::Timestamp(*t)),
            Some(raw) => {
                let text = raw.to_string();
                let parsed = parse_capture_time(&text);
                if parsed.is_none() {
                    tracing::warn!(
                        op = "snapshot_build",
                        image_id = %self.image_id,
                        attribute = Attribute::CaptureTime.name(),
                        raw = %text,
                        "unparsable capture time treated as absent"
                    );
                }
                parsed.map(Value::Timestamp)
            }
            None => None,
        };
        if !self.values.contains_key(&Attribute::ParsedCaptureTime) {
            self.set(Attribute::ParsedCaptureTime, parsed);
        }

        if !self.values.contains_key(&Attribute::GpsLocation) {
            let latitude = self.values.get(&Attribute::GpsLatitude);
            let longitude = self.values.get(&Attribute::GpsLongitude);
            if latitude.is_some() != longitude.is_some() {
                tracing::debug!(
                    image_id = %self.image_id,
                    "half-present coordinate pair treated as absent location"
                );
            }
            let location = compose_location(latitude, longitude).map(Value::Location);
            self.set(Attribute::GpsLocation, location);
        }

        if !self.values.contains_key(&Attribute::FileLink) {
            let link = compose_file_link(
                self.values.get(&Attribute::RootPath),
                self.values.get(&Attribute::FolderPath),
                self.values.get(&Attribute::Filename),
            )
            .map(Value::Text);
            self.set(Attribute::FileLink, link);
        }
    }
}

impl AttributeSource for ImageRow {
    fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    fn get(&self, attribute: Attribute) -> Option<&Value> {
        self.values.get(&attribute)
    }
}

/// Kind of many-to-many membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MembershipKind {
    Keyword,
    Collection,
}

impl MembershipKind {
    /// Attribute holding the membership name
    pub fn attribute(self) -> Attribute {
        match self {
            MembershipKind::Keyword => Attribute::Keyword,
            MembershipKind::Collection => Attribute::Collection,
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            MembershipKind::Keyword => "keywords",
            MembershipKind::Collection => "collections",
        }
    }
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute().name())
    }
}

/// One `(image, group name)` association.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRow {
    pub image_id: ImageId,
    pub name: String,
    report: BTreeMap<Attribute, Value>,
    name_value: Value,
}

impl MembershipRow {
    pub fn new(image_id: impl Into<ImageId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            image_id: image_id.into(),
            name_value: Value::Text(name.clone()),
            name,
            report: BTreeMap::new(),
        }
    }

    /// Attach a denormalized report value
    pub fn with_report(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.report.insert(attribute, value.into());
        self
    }
}

impl AttributeSource for MembershipRow {
    fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    fn get(&self, attribute: Attribute) -> Option<&Value> {
        match attribute {
            Attribute::Keyword | Attribute::Collection => Some(&self.name_value),
            other => self.report.get(&other),
        }
    }
}

/// The image table of one snapshot.
#[derive(Debug, Clone)]
pub struct ImageTable {
    columns: BTreeSet<Attribute>,
    rows: Vec<ImageRow>,
}

impl ImageTable {
    pub fn columns(&self) -> &BTreeSet<Attribute> {
        &self.columns
    }

    pub fn rows(&self) -> &[ImageRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A keyword or collection membership table of one snapshot.
#[derive(Debug, Clone)]
pub struct MembershipTable {
    kind: MembershipKind,
    columns: BTreeSet<Attribute>,
    rows: Vec<MembershipRow>,
}

impl MembershipTable {
    pub fn kind(&self) -> MembershipKind {
        self.kind
    }

    /// The name attribute plus every denormalized report column
    pub fn columns(&self) -> &BTreeSet<Attribute> {
        &self.columns
    }

    pub fn rows(&self) -> &[MembershipRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derived attributes and the stored attributes they are computed from.
const DERIVATIONS: &[(Attribute, &[Attribute])] = &[
    (Attribute::ParsedCaptureTime, &[Attribute::CaptureTime]),
    (
        Attribute::GpsLocation,
        &[Attribute::GpsLatitude, Attribute::GpsLongitude],
    ),
    (
        Attribute::FileLink,
        &[Attribute::RootPath, Attribute::FolderPath, Attribute::Filename],
    ),
];

/// Raw rows handed over by a loader.
#[derive(Debug, Clone)]
pub struct SnapshotParts {
    /// Human-readable origin (usually the catalog path)
    pub label: String,
    /// Attributes the source provides for images; derived attributes are
    /// added during the build.
    pub image_columns: BTreeSet<Attribute>,
    pub images: Vec<ImageRow>,
    pub keywords: Vec<MembershipRow>,
    pub collections: Vec<MembershipRow>,
}

impl SnapshotParts {
    /// Parts for a source providing every stored image attribute
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            image_columns: Attribute::stored_image_attributes().collect(),
            images: Vec::new(),
            keywords: Vec::new(),
            collections: Vec::new(),
        }
    }

    pub fn image(mut self, row: ImageRow) -> Self {
        self.images.push(row);
        self
    }

    pub fn keyword(mut self, image_id: impl Into<ImageId>, name: impl Into<String>) -> Self {
        self.keywords.push(MembershipRow::new(image_id, name));
        self
    }

    pub fn collection(mut self, image_id: impl Into<ImageId>, name: impl Into<String>) -> Self {
        self.collections.push(MembershipRow::new(image_id, name));
        self
    }
}

/// One immutable point-in-time extraction of a catalog.
#[derive(Debug, Clone)]
pub struct Snapshot {
    label: String,
    images: ImageTable,
    keywords: MembershipTable,
    collections: MembershipTable,
}

impl Snapshot {
    /// Build a snapshot from loader output.
    ///
    /// # Errors
    ///
    /// - `DuplicateImageId`: two image rows share a global id
    pub fn build(parts: SnapshotParts, config: &Config) -> Result<Snapshot> {
        let SnapshotParts {
            label,
            mut image_columns,
            mut images,
            keywords,
            collections,
        } = parts;

        let mut seen: BTreeSet<&ImageId> = BTreeSet::new();
        for row in &images {
            if !seen.insert(&row.image_id) {
                return Err(CatalogDiffError::DuplicateImageId {
                    snapshot: label.clone(),
                    image_id: row.image_id.to_string(),
                }
                .into());
            }
        }

        for row in &mut images {
            row.derive_attributes();
        }
        for (derived, sources) in DERIVATIONS {
            if sources.iter().all(|a| image_columns.contains(a)) {
                image_columns.insert(*derived);
            }
        }

        let by_id: HashMap<&ImageId, &ImageRow> =
            images.iter().map(|row| (&row.image_id, row)).collect();
        let report_columns = &config.report_columns;

        let denormalize = |kind: MembershipKind, rows: Vec<MembershipRow>| {
            let rows: Vec<MembershipRow> = rows
                .into_iter()
                .filter(|row| {
                    kind != MembershipKind::Collection
                        || !config.ignored_membership_names.contains(&row.name)
                })
                .map(|mut row| {
                    if let Some(image) = by_id.get(&row.image_id) {
                        for attribute in report_columns {
                            if row.report.contains_key(attribute) {
                                continue;
                            }
                            if let Some(value) = image.get(*attribute) {
                                row.report.insert(*attribute, value.clone());
                            }
                        }
                    }
                    row
                })
                .collect();
            let mut columns: BTreeSet<Attribute> = report_columns
                .iter()
                .copied()
                .filter(|attribute| image_columns.contains(attribute))
                .collect();
            columns.insert(kind.attribute());
            MembershipTable {
                kind,
                columns,
                rows,
            }
        };

        let keywords = denormalize(MembershipKind::Keyword, keywords);
        let collections = denormalize(MembershipKind::Collection, collections);

        tracing::debug!(
            catalog = %label,
            images = images.len(),
            keywords = keywords.len(),
            collections = collections.len(),
            "snapshot built"
        );

        Ok(Snapshot {
            label,
            images: ImageTable {
                columns: image_columns,
                rows: images,
            },
            keywords,
            collections,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn images(&self) -> &ImageTable {
        &self.images
    }

    pub fn keywords(&self) -> &MembershipTable {
        &self.keywords
    }

    pub fn collections(&self) -> &MembershipTable {
        &self.collections
    }

    pub fn memberships(&self, kind: MembershipKind) -> &MembershipTable {
        match kind {
            MembershipKind::Keyword => &self.keywords,
            MembershipKind::Collection => &self.collections,
        }
    }
}
