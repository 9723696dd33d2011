//! Attribute registry.
//!
//! Every semantic attribute the engine knows about is listed once in
//! [`ATTRIBUTES`], together with where it is stored in a catalog and which
//! kind of value it carries. The table is indexed by the enum discriminant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A semantic attribute of an image or membership row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    IdGlobal,
    RootFile,
    Caption,
    GpsLatitude,
    GpsLongitude,
    GpsLocation,
    Rating,
    ColorLabels,
    CaptureTime,
    ParsedCaptureTime,
    Hash,
    Filename,
    FolderPath,
    RootPath,
    FileLink,
    Keyword,
    Collection,
}

/// How a diff column's delta is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// `right - left`
    Numeric,
    /// Great-circle distance between two coordinate pairs
    Geographic,
    /// Elapsed seconds between two timestamps
    Temporal,
    /// No delta
    Opaque,
}

/// Where an attribute's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// A column of the image query
    Image {
        table: &'static str,
        column: &'static str,
    },
    /// The name column of a membership query
    Membership {
        table: &'static str,
        column: &'static str,
    },
    /// Computed from other attributes while building a snapshot
    Derived,
}

/// Registry entry for one attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    pub attribute: Attribute,
    pub name: &'static str,
    pub storage: Storage,
    pub kind: ColumnKind,
}

const fn image(table: &'static str, column: &'static str) -> Storage {
    Storage::Image { table, column }
}

/// The registry, in enum declaration order.
pub const ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec {
        attribute: Attribute::IdGlobal,
        name: "ID_GLOBAL",
        storage: image("Adobe_images", "id_global"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::RootFile,
        name: "ROOT_FILE",
        storage: image("Adobe_images", "rootFile"),
        kind: ColumnKind::Numeric,
    },
    AttributeSpec {
        attribute: Attribute::Caption,
        name: "CAPTION",
        storage: image("AgLibraryIPTC", "caption"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::GpsLatitude,
        name: "GPS_LATITUDE",
        storage: image("AgHarvestedExifMetadata", "gpsLatitude"),
        kind: ColumnKind::Numeric,
    },
    AttributeSpec {
        attribute: Attribute::GpsLongitude,
        name: "GPS_LONGITUDE",
        storage: image("AgHarvestedExifMetadata", "gpsLongitude"),
        kind: ColumnKind::Numeric,
    },
    AttributeSpec {
        attribute: Attribute::GpsLocation,
        name: "GPS_LOCATION",
        storage: Storage::Derived,
        kind: ColumnKind::Geographic,
    },
    AttributeSpec {
        attribute: Attribute::Rating,
        name: "RATING",
        storage: image("Adobe_images", "rating"),
        kind: ColumnKind::Numeric,
    },
    AttributeSpec {
        attribute: Attribute::ColorLabels,
        name: "COLOR_LABELS",
        storage: image("Adobe_images", "colorLabels"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::CaptureTime,
        name: "CAPTURE_TIME",
        storage: image("Adobe_images", "captureTime"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::ParsedCaptureTime,
        name: "PARSED_CAPTURE_TIME",
        storage: Storage::Derived,
        kind: ColumnKind::Temporal,
    },
    AttributeSpec {
        attribute: Attribute::Hash,
        name: "HASH",
        storage: image("AgLibraryFile", "importHash"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::Filename,
        name: "FILENAME",
        storage: image("AgLibraryFile", "idx_filename"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::FolderPath,
        name: "FOLDER_PATH",
        storage: image("AgLibraryFolder", "pathFromRoot"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::RootPath,
        name: "ROOT_PATH",
        storage: image("AgLibraryRootFolder", "absolutePath"),
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::FileLink,
        name: "FILE_LINK",
        storage: Storage::Derived,
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::Keyword,
        name: "KEYWORD",
        storage: Storage::Membership {
            table: "AgLibraryKeyword",
            column: "name",
        },
        kind: ColumnKind::Opaque,
    },
    AttributeSpec {
        attribute: Attribute::Collection,
        name: "COLLECTION",
        storage: Storage::Membership {
            table: "AgLibraryCollection",
            column: "name",
        },
        kind: ColumnKind::Opaque,
    },
];

impl Attribute {
    /// Registry entry for this attribute
    pub fn spec(self) -> &'static AttributeSpec {
        &ATTRIBUTES[self as usize]
    }

    /// Stable SCREAMING_SNAKE_CASE identifier
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Registry-declared value kind
    pub fn kind(self) -> ColumnKind {
        self.spec().kind
    }

    pub fn storage(self) -> Storage {
        self.spec().storage
    }

    /// Identity attributes never participate in value diffing.
    pub fn is_identity(self) -> bool {
        matches!(self, Attribute::IdGlobal | Attribute::RootFile)
    }

    /// True for attributes carried by image rows (stored or derived).
    pub fn is_image_attribute(self) -> bool {
        !matches!(self.storage(), Storage::Membership { .. })
    }

    /// All attributes, in registry order
    pub fn all() -> impl Iterator<Item = Attribute> {
        ATTRIBUTES.iter().map(|spec| spec.attribute)
    }

    /// All attributes an image table carries
    pub fn image_attributes() -> impl Iterator<Item = Attribute> {
        Self::all().filter(|a| a.is_image_attribute())
    }

    /// Image attributes read from a catalog rather than derived
    pub fn stored_image_attributes() -> impl Iterator<Item = Attribute> {
        Self::all().filter(|a| matches!(a.storage(), Storage::Image { .. }))
    }

    /// Look up an attribute by its identifier
    pub fn from_name(name: &str) -> Option<Attribute> {
        ATTRIBUTES
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.attribute)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::from_name(s).ok_or_else(|| format!("unknown attribute `{}`", s))
    }
}
