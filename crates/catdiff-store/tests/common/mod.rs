use rusqlite::{params, Connection};
use std::path::Path;

/// Minimal subset of the catalog schema read by the loader
pub const SCHEMA: &str = "
CREATE TABLE Adobe_images (
    id_local INTEGER PRIMARY KEY,
    id_global TEXT,
    rootFile INTEGER,
    rating REAL,
    colorLabels TEXT,
    captureTime TEXT
);
CREATE TABLE AgLibraryIPTC (id_local INTEGER PRIMARY KEY, image INTEGER, caption TEXT);
CREATE TABLE AgHarvestedExifMetadata (
    id_local INTEGER PRIMARY KEY,
    image INTEGER,
    gpsLatitude REAL,
    gpsLongitude REAL
);
CREATE TABLE AgLibraryRootFolder (id_local INTEGER PRIMARY KEY, absolutePath TEXT);
CREATE TABLE AgLibraryFolder (id_local INTEGER PRIMARY KEY, rootFolder INTEGER, pathFromRoot TEXT);
CREATE TABLE AgLibraryFile (
    id_local INTEGER PRIMARY KEY,
    folder INTEGER,
    idx_filename TEXT,
    importHash
);
CREATE TABLE AgLibraryKeyword (id_local INTEGER PRIMARY KEY, name TEXT);
CREATE TABLE AgLibraryKeywordImage (id_local INTEGER PRIMARY KEY, image INTEGER, tag INTEGER);
CREATE TABLE AgLibraryCollection (id_local INTEGER PRIMARY KEY, name TEXT);
CREATE TABLE AgLibraryCollectionImage (id_local INTEGER PRIMARY KEY, image INTEGER, collection INTEGER);
INSERT INTO AgLibraryRootFolder (id_local, absolutePath) VALUES (1, '/Users/me/Pictures/');
INSERT INTO AgLibraryFolder (id_local, rootFolder, pathFromRoot) VALUES (1, 1, '2019/08/');
";

/// Writes a small catalog through a connection
#[allow(dead_code)]
pub struct CatalogFixture {
    pub conn: Connection,
}

#[allow(dead_code)]
impl CatalogFixture {
    pub fn in_memory() -> Self {
        Self::with_connection(Connection::open_in_memory().unwrap())
    }

    pub fn at(path: &Path) -> Self {
        Self::with_connection(Connection::open(path).unwrap())
    }

    fn with_connection(conn: Connection) -> Self {
        conn.execute_batch(SCHEMA).unwrap();
        Self { conn }
    }

    /// Add an image backed by a file in the shared folder
    pub fn photo(&self, local: i64, global: &str, filename: &str, rating: Option<f64>) -> &Self {
        self.conn
            .execute(
                "INSERT INTO AgLibraryFile (id_local, folder, idx_filename) VALUES (?1, 1, ?2)",
                params![local, filename],
            )
            .unwrap();
        self.conn
            .execute(
                "INSERT INTO Adobe_images (id_local, id_global, rootFile, rating) VALUES (?1, ?2, ?1, ?3)",
                params![local, global, rating],
            )
            .unwrap();
        self
    }

    pub fn caption(&self, local: i64, caption: &str) -> &Self {
        self.conn
            .execute(
                "INSERT INTO AgLibraryIPTC (image, caption) VALUES (?1, ?2)",
                params![local, caption],
            )
            .unwrap();
        self
    }

    pub fn gps(&self, local: i64, lat: f64, lon: f64) -> &Self {
        self.conn
            .execute(
                "INSERT INTO AgHarvestedExifMetadata (image, gpsLatitude, gpsLongitude) VALUES (?1, ?2, ?3)",
                params![local, lat, lon],
            )
            .unwrap();
        self
    }

    pub fn keyword(&self, local: i64, name: &str) -> &Self {
        self.membership("AgLibraryKeyword", "AgLibraryKeywordImage", "tag", local, name)
    }

    pub fn collection(&self, local: i64, name: &str) -> &Self {
        self.membership(
            "AgLibraryCollection",
            "AgLibraryCollectionImage",
            "collection",
            local,
            name,
        )
    }

    fn membership(&self, table: &str, link: &str, key: &str, local: i64, name: &str) -> &Self {
        let existing: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT id_local FROM {} WHERE name = ?1", table),
                [name],
                |row| row.get(0),
            )
            .ok();
        let group = match existing {
            Some(id) => id,
            None => {
                self.conn
                    .execute(&format!("INSERT INTO {} (name) VALUES (?1)", table), [name])
                    .unwrap();
                self.conn.last_insert_rowid()
            }
        };
        self.conn
            .execute(
                &format!("INSERT INTO {} (image, {}) VALUES (?1, ?2)", link, key),
                params![local, group],
            )
            .unwrap();
        self
    }
}
