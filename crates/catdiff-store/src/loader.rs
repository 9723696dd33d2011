//! Snapshot loading from a catalog database.
//!
//! The image query is assembled from the attribute registry: every stored
//! image attribute whose table and column exist in the catalog is selected,
//! everything else is left out of the snapshot's column set. Membership
//! rows only carry the image id and the group name; report columns are
//! copied onto them when the snapshot is built.

#![allow(clippy::result_large_err)]

use crate::db::{open_read_only, table_columns, table_exists};
use crate::errors::{from_rusqlite, Result};
use catdiff_core::errors::{ExError, ExErrorKind};
use catdiff_core::model::{
    Attribute, ImageRow, MembershipKind, MembershipRow, Snapshot, SnapshotParts, Storage, Value,
};
use catdiff_core::{log_op_end, log_op_error, log_op_start, Config};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Instant;

const IMAGE_TABLE: &str = "Adobe_images";

/// A LEFT JOIN onto the image table, only taken when `parent` was joined.
struct Join {
    table: &'static str,
    on: &'static str,
    parent: &'static str,
}

const IMAGE_JOINS: &[Join] = &[
    Join {
        table: "AgLibraryIPTC",
        on: "AgLibraryIPTC.image = Adobe_images.id_local",
        parent: IMAGE_TABLE,
    },
    Join {
        table: "AgHarvestedExifMetadata",
        on: "AgHarvestedExifMetadata.image = Adobe_images.id_local",
        parent: IMAGE_TABLE,
    },
    Join {
        table: "AgLibraryFile",
        on: "AgLibraryFile.id_local = Adobe_images.rootFile",
        parent: IMAGE_TABLE,
    },
    Join {
        table: "AgLibraryFolder",
        on: "AgLibraryFolder.id_local = AgLibraryFile.folder",
        parent: "AgLibraryFile",
    },
    Join {
        table: "AgLibraryRootFolder",
        on: "AgLibraryRootFolder.id_local = AgLibraryFolder.rootFolder",
        parent: "AgLibraryFolder",
    },
];

/// Link table and foreign-key column of a membership kind
fn link_table(kind: MembershipKind) -> (&'static str, &'static str) {
    match kind {
        MembershipKind::Keyword => ("AgLibraryKeywordImage", "tag"),
        MembershipKind::Collection => ("AgLibraryCollectionImage", "collection"),
    }
}

/// The image SELECT and the attributes it yields, in column order.
#[derive(Debug, Clone)]
pub struct ImageQuery {
    pub sql: String,
    pub attributes: Vec<Attribute>,
}

/// Build the image query for the tables and columns present in `conn`.
///
/// # Errors
///
/// - `InvalidInput`: the database has no image table with global ids
/// - `Persistence`: schema introspection failed
pub fn image_query(conn: &Connection) -> Result<ImageQuery> {
    let mut schema: HashMap<&'static str, BTreeSet<String>> = HashMap::new();
    schema.insert(
        IMAGE_TABLE,
        table_columns(conn, IMAGE_TABLE)?.into_iter().collect(),
    );
    if !schema[IMAGE_TABLE].contains("id_global") {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("image_query")
            .with_message("database has no Adobe_images.id_global column; not a catalog"));
    }

    let mut joins = Vec::new();
    for join in IMAGE_JOINS {
        if !schema.contains_key(join.parent) {
            continue;
        }
        let columns = table_columns(conn, join.table)?;
        if columns.is_empty() {
            tracing::debug!(table = join.table, "catalog table missing; columns skipped");
            continue;
        }
        schema.insert(join.table, columns.into_iter().collect());
        joins.push(join);
    }

    let mut attributes = Vec::new();
    let mut selected = vec![format!("{}.id_global", IMAGE_TABLE)];
    for attribute in Attribute::stored_image_attributes() {
        if attribute == Attribute::IdGlobal {
            continue;
        }
        let Storage::Image { table, column } = attribute.storage() else {
            continue;
        };
        if schema.get(table).is_some_and(|c| c.contains(column)) {
            selected.push(format!("{}.{}", table, column));
            attributes.push(attribute);
        } else {
            tracing::debug!(
                attribute = attribute.name(),
                table,
                column,
                "catalog column missing"
            );
        }
    }

    let mut sql = format!("SELECT {} FROM {}", selected.join(", "), IMAGE_TABLE);
    for join in joins {
        sql.push_str(&format!(" LEFT JOIN {} ON {}", join.table, join.on));
    }
    sql.push_str(&format!(" ORDER BY {}.id_local", IMAGE_TABLE));

    Ok(ImageQuery { sql, attributes })
}

/// Map a SQLite cell to a value; BLOBs become lowercase hex text.
pub fn to_value(value: ValueRef<'_>) -> Option<Value> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(Value::Integer(i)),
        ValueRef::Real(r) => Some(Value::Real(r)),
        ValueRef::Text(t) => Some(Value::Text(String::from_utf8_lossy(t).into_owned())),
        ValueRef::Blob(b) => Some(Value::Text(hex::encode(b))),
    }
}

fn load_images(conn: &Connection, label: &str) -> Result<(Vec<Attribute>, Vec<ImageRow>)> {
    let query = image_query(conn)?;
    tracing::debug!(catalog = label, sql = %query.sql, "image query");

    let mut stmt = conn.prepare(&query.sql).map_err(from_rusqlite)?;
    let mut rows = stmt.query([]).map_err(from_rusqlite)?;
    let mut images = Vec::new();

    while let Some(row) = rows.next().map_err(from_rusqlite)? {
        let Some(id) = to_value(row.get_ref(0).map_err(from_rusqlite)?) else {
            tracing::warn!(catalog = label, "image without global id skipped");
            continue;
        };
        let mut image = ImageRow::new(id.to_string());
        for (offset, attribute) in query.attributes.iter().enumerate() {
            let cell = row.get_ref(offset + 1).map_err(from_rusqlite)?;
            image.set(*attribute, to_value(cell));
        }
        images.push(image);
    }

    Ok((query.attributes, images))
}

fn load_memberships(
    conn: &Connection,
    kind: MembershipKind,
    label: &str,
) -> Result<Vec<MembershipRow>> {
    let (link, foreign_key) = link_table(kind);
    let Storage::Membership { table, column } = kind.attribute().storage() else {
        return Err(ExError::new(ExErrorKind::Internal)
            .with_op("load_memberships")
            .with_attribute(kind.attribute().name())
            .with_message("membership attribute has no membership storage"));
    };

    if !table_exists(conn, link)? || !table_exists(conn, table)? {
        tracing::debug!(catalog = label, table = link, "membership tables missing");
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {images}.id_global, {table}.{column} FROM {link} \
         LEFT JOIN {images} ON {images}.id_local = {link}.image \
         LEFT JOIN {table} ON {table}.id_local = {link}.{foreign_key} \
         ORDER BY {link}.id_local",
        images = IMAGE_TABLE,
    );

    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
    let mut rows = stmt.query([]).map_err(from_rusqlite)?;
    let mut memberships = Vec::new();

    while let Some(row) = rows.next().map_err(from_rusqlite)? {
        let id = to_value(row.get_ref(0).map_err(from_rusqlite)?);
        let name = to_value(row.get_ref(1).map_err(from_rusqlite)?);
        match (id, name) {
            (Some(id), Some(name)) => {
                memberships.push(MembershipRow::new(id.to_string(), name.to_string()))
            }
            _ => tracing::debug!(
                catalog = label,
                table = link,
                "dangling membership row skipped"
            ),
        }
    }

    Ok(memberships)
}

/// Load a snapshot from an open connection.
///
/// # Errors
///
/// - `InvalidInput`: the database is not a catalog
/// - `Persistence`: a query failed
/// - `DuplicateImageId`: two images share a global id
pub fn load_catalog_from_connection(
    conn: &Connection,
    label: &str,
    config: &Config,
) -> Result<Snapshot> {
    let (attributes, images) = load_images(conn, label)?;
    let keywords = load_memberships(conn, MembershipKind::Keyword, label)?;
    let collections = load_memberships(conn, MembershipKind::Collection, label)?;

    let mut parts = SnapshotParts::new(label);
    parts.image_columns = attributes.into_iter().collect();
    parts.image_columns.insert(Attribute::IdGlobal);
    parts.images = images;
    parts.keywords = keywords;
    parts.collections = collections;

    Snapshot::build(parts, config).map_err(|e| e.with_entity_id(label))
}

/// Open a catalog file read-only and load its snapshot.
///
/// # Errors
///
/// - `NotFound`: the file does not exist
/// - see [`load_catalog_from_connection`]
pub fn load_catalog(path: &Path, config: &Config) -> Result<Snapshot> {
    let label = path.display().to_string();
    log_op_start!("load_catalog", catalog = label.as_str());
    let start = Instant::now();

    open_read_only(path)
        .and_then(|conn| load_catalog_from_connection(&conn, &label, config))
        .map(|snapshot| {
            log_op_end!(
                "load_catalog",
                duration_ms = start.elapsed().as_millis() as u64,
                catalog = label.as_str(),
                row_count = snapshot.images().len()
            );
            snapshot
        })
        .map_err(|e| {
            log_op_error!(
                "load_catalog",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                catalog = label.as_str()
            );
            e
        })
}
