//! SQLite-backed metadata store.
//!
//! `MetadataStore` is the seam the IPFS operations work against; it only
//! needs album/item enumeration, inserts, and field persistence.
//! `SqliteLibrary` is the on-disk implementation, one file per library.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, Row};

use super::models::{Album, Item};
use super::query::Query;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS albums (
    id          INTEGER PRIMARY KEY,
    album       TEXT NOT NULL DEFAULT '',
    albumartist TEXT NOT NULL DEFAULT '',
    year        INTEGER,
    mb_albumid  TEXT,
    artpath     TEXT NOT NULL DEFAULT '',
    ipfs        TEXT,
    added       TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS items (
    id          INTEGER PRIMARY KEY,
    album_id    INTEGER REFERENCES albums(id),
    title       TEXT NOT NULL DEFAULT '',
    artist      TEXT NOT NULL DEFAULT '',
    album       TEXT NOT NULL DEFAULT '',
    albumartist TEXT NOT NULL DEFAULT '',
    track       INTEGER NOT NULL DEFAULT 0,
    disc        INTEGER NOT NULL DEFAULT 0,
    mb_trackid  TEXT,
    path        TEXT NOT NULL DEFAULT '',
    ipfs        TEXT,
    added       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS items_album_id ON items(album_id);
"#;

const ALBUM_COLUMNS: &str = "id, album, albumartist, year, mb_albumid, artpath, ipfs, added";
const ITEM_COLUMNS: &str =
    "id, album_id, title, artist, album, albumartist, track, disc, mb_trackid, path, ipfs, added";

/// Record store used by the IPFS operations
pub trait MetadataStore {
    /// Location of the backing file
    fn path(&self) -> &Path;

    /// Albums matching a query, ordered by album artist then title
    fn albums(&self, query: &Query) -> Result<Vec<Album>>;

    /// Items of an album in library order (disc, track, id)
    fn album_items(&self, album: &Album) -> Result<Vec<Item>>;

    /// Insert an item as a new row, setting its id
    fn add_item(&self, item: &mut Item) -> Result<i64>;

    /// Insert an album as a new row, setting its id
    fn add_album(&self, album: &mut Album) -> Result<i64>;

    /// Persist an existing item's fields
    fn store_item(&self, item: &Item) -> Result<()>;

    /// Persist an existing album's fields
    fn store_album(&self, album: &Album) -> Result<()>;

    /// Whether an album with this identity key exists (absent keys compare equal)
    fn has_album_key(&self, mb_albumid: Option<&str>) -> Result<bool>;

    /// Directory holding the album's files: the parent of its first item
    fn album_dir(&self, album: &Album) -> Result<Option<PathBuf>> {
        Ok(self
            .album_items(album)?
            .first()
            .and_then(|item| item.dir()))
    }

    /// Copy an album and its items in as new rows, linking the items to the new album
    fn copy_album(&self, album: &Album, items: &[Item]) -> Result<i64> {
        let mut copy = album.detached();
        let album_id = self.add_album(&mut copy)?;
        for item in items {
            let mut copy = item.detached();
            copy.album_id = Some(album_id);
            self.add_item(&mut copy)?;
        }
        Ok(album_id)
    }
}

/// A library stored in a single SQLite file
pub struct SqliteLibrary {
    path: PathBuf,
    conn: Connection,
}

impl std::fmt::Debug for SqliteLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLibrary")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteLibrary {
    /// Open a library file, creating it and its schema if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create library dir: {}", parent.display()))?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open library: {}", path.display()))?;
        conn.execute_batch(SCHEMA)
            .with_context(|| format!("Failed to initialize library schema: {}", path.display()))?;

        Ok(Self { path, conn })
    }

    /// Open an existing library without write access
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open library read-only: {}", path.display()))?;

        Ok(Self { path, conn })
    }

    /// In-memory library (tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory library")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Total number of albums
    pub fn album_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM albums", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All items, in insertion order
    pub fn items(&self) -> Result<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM items ORDER BY id", ITEM_COLUMNS))?;
        let items = stmt
            .query_map([], map_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read items")?;
        Ok(items)
    }
}

fn map_album_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        album: row.get(1)?,
        albumartist: row.get(2)?,
        year: row.get(3)?,
        mb_albumid: row.get(4)?,
        artpath: row.get(5)?,
        ipfs: row.get(6)?,
        added: row.get(7)?,
    })
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        album_id: row.get(1)?,
        title: row.get(2)?,
        artist: row.get(3)?,
        album: row.get(4)?,
        albumartist: row.get(5)?,
        track: row_number(row, 6)?,
        disc: row_number(row, 7)?,
        mb_trackid: row.get(8)?,
        path: row.get(9)?,
        ipfs: row.get(10)?,
        added: row.get(11)?,
    })
}

/// Track and disc numbers from other libraries may be out of range; clamp them
fn row_number(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let value: i64 = row.get(idx)?;
    Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
}

impl MetadataStore for SqliteLibrary {
    fn path(&self) -> &Path {
        &self.path
    }

    fn albums(&self, query: &Query) -> Result<Vec<Album>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM albums ORDER BY albumartist, album, id",
            ALBUM_COLUMNS
        ))?;
        let albums = stmt
            .query_map([], map_album_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read albums: {}", self.path.display()))?;

        Ok(albums.into_iter().filter(|a| query.matches(a)).collect())
    }

    fn album_items(&self, album: &Album) -> Result<Vec<Item>> {
        let Some(album_id) = album.id else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items WHERE album_id = ?1 ORDER BY disc, track, id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![album_id], map_item_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Failed to read items of album {}", album_id))?;
        Ok(items)
    }

    fn add_item(&self, item: &mut Item) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO items (album_id, title, artist, album, albumartist, track, disc,
                                    mb_trackid, path, ipfs, added)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    item.album_id,
                    item.title,
                    item.artist,
                    item.album,
                    item.albumartist,
                    item.track,
                    item.disc,
                    item.mb_trackid,
                    item.path,
                    item.ipfs,
                    item.added,
                ],
            )
            .with_context(|| format!("Failed to insert item '{}'", item.title))?;

        let id = self.conn.last_insert_rowid();
        item.id = Some(id);
        Ok(id)
    }

    fn add_album(&self, album: &mut Album) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO albums (album, albumartist, year, mb_albumid, artpath, ipfs, added)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    album.album,
                    album.albumartist,
                    album.year,
                    album.mb_albumid,
                    album.artpath,
                    album.ipfs,
                    album.added,
                ],
            )
            .with_context(|| format!("Failed to insert album '{}'", album.album))?;

        let id = self.conn.last_insert_rowid();
        album.id = Some(id);
        Ok(id)
    }

    fn store_item(&self, item: &Item) -> Result<()> {
        let id = item.id.context("Cannot store an item that was never added")?;
        self.conn
            .execute(
                "UPDATE items SET album_id = ?2, title = ?3, artist = ?4, album = ?5,
                        albumartist = ?6, track = ?7, disc = ?8, mb_trackid = ?9,
                        path = ?10, ipfs = ?11
                 WHERE id = ?1",
                params![
                    id,
                    item.album_id,
                    item.title,
                    item.artist,
                    item.album,
                    item.albumartist,
                    item.track,
                    item.disc,
                    item.mb_trackid,
                    item.path,
                    item.ipfs,
                ],
            )
            .with_context(|| format!("Failed to store item {}", id))?;
        Ok(())
    }

    fn store_album(&self, album: &Album) -> Result<()> {
        let id = album.id.context("Cannot store an album that was never added")?;
        self.conn
            .execute(
                "UPDATE albums SET album = ?2, albumartist = ?3, year = ?4, mb_albumid = ?5,
                        artpath = ?6, ipfs = ?7
                 WHERE id = ?1",
                params![
                    id,
                    album.album,
                    album.albumartist,
                    album.year,
                    album.mb_albumid,
                    album.artpath,
                    album.ipfs,
                ],
            )
            .with_context(|| format!("Failed to store album {}", id))?;
        Ok(())
    }

    fn has_album_key(&self, mb_albumid: Option<&str>) -> Result<bool> {
        let exists: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM albums WHERE mb_albumid IS ?1)",
                params![mb_albumid],
                |row| row.get(0),
            )
            .context("Failed to look up album identity key")?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> (SqliteLibrary, Album) {
        let lib = SqliteLibrary::open_in_memory().unwrap();
        let mut album = Album::new("X", "Artist").with_mb_albumid("rel-1");
        lib.add_album(&mut album).unwrap();

        // Inserted out of order to exercise native ordering
        for (track, title) in [(2, "Two"), (1, "One")] {
            let mut item = Item::new(title, format!("/music/X/{:02} {}.flac", track, title))
                .with_track(track);
            item.album_id = album.id;
            lib.add_item(&mut item).unwrap();
        }
        (lib, album)
    }

    #[test]
    fn test_album_items_in_track_order() {
        let (lib, album) = seeded();
        let items = lib.album_items(&album).unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_album_dir_from_first_item() {
        let (lib, album) = seeded();
        assert_eq!(lib.album_dir(&album).unwrap(), Some(PathBuf::from("/music/X")));

        let mut empty = Album::new("Empty", "Nobody");
        lib.add_album(&mut empty).unwrap();
        assert_eq!(lib.album_dir(&empty).unwrap(), None);
    }

    #[test]
    fn test_store_persists_cid() {
        let (lib, mut album) = seeded();
        album.ipfs = Some("QmAlbum".to_string());
        lib.store_album(&album).unwrap();

        let albums = lib.albums(&Query::all()).unwrap();
        assert_eq!(albums[0].ipfs.as_deref(), Some("QmAlbum"));
    }

    #[test]
    fn test_has_album_key() {
        let (lib, _) = seeded();
        assert!(lib.has_album_key(Some("rel-1")).unwrap());
        assert!(!lib.has_album_key(Some("rel-2")).unwrap());
        assert!(!lib.has_album_key(None).unwrap());

        let mut keyless = Album::new("Bootleg", "Someone");
        lib.add_album(&mut keyless).unwrap();
        assert!(lib.has_album_key(None).unwrap());
    }

    #[test]
    fn test_copy_album_links_items() {
        let (src, album) = seeded();
        let items = src.album_items(&album).unwrap();

        let dst = SqliteLibrary::open_in_memory().unwrap();
        let new_id = dst.copy_album(&album, &items).unwrap();

        let copied = dst.albums(&Query::all()).unwrap();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].id, Some(new_id));
        assert_eq!(dst.album_items(&copied[0]).unwrap().len(), 2);
    }

    #[test]
    fn test_out_of_range_numbers_are_clamped() {
        let (lib, album) = seeded();
        lib.conn
            .execute(
                "INSERT INTO items (album_id, title, track, disc, added)
                 VALUES (?1, 'Hidden', -3, 5000000000, ?2)",
                params![album.id, chrono::Utc::now()],
            )
            .unwrap();

        let items = lib.album_items(&album).unwrap();
        let hidden = items.iter().find(|i| i.title == "Hidden").unwrap();
        assert_eq!(hidden.track, 0);
        assert_eq!(hidden.disc, u32::MAX);

        let dst = SqliteLibrary::open_in_memory().unwrap();
        dst.copy_album(&album, &items).unwrap();
        assert_eq!(dst.items().unwrap().len(), 3);
    }

    #[test]
    fn test_open_creates_file_and_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("library.db");

        {
            let lib = SqliteLibrary::open(&path).unwrap();
            let mut album = Album::new("A", "B");
            lib.add_album(&mut album).unwrap();
        }

        assert!(path.exists());
        let reopened = SqliteLibrary::open_read_only(&path).unwrap();
        assert_eq!(reopened.album_count().unwrap(), 1);
    }
}
