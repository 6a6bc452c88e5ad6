//! Item and album records.
//!
//! Both records carry an optional `ipfs` content identifier that is set
//! once the record has been added to the network.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single track in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Row id (None until inserted)
    pub id: Option<i64>,

    /// Owning album row id
    pub album_id: Option<i64>,

    pub title: String,
    pub artist: String,
    pub album: String,
    pub albumartist: String,
    pub track: u32,
    pub disc: u32,

    /// MusicBrainz recording id
    pub mb_trackid: Option<String>,

    /// Local file path (empty when the item has no local file)
    pub path: String,

    /// Content identifier once published
    pub ipfs: Option<String>,

    /// When the item entered the library
    pub added: DateTime<Utc>,
}

impl Item {
    /// Create a new item pointing at a local file
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: None,
            album_id: None,
            title: title.into(),
            artist: String::new(),
            album: String::new(),
            albumartist: String::new(),
            track: 0,
            disc: 0,
            mb_trackid: None,
            path: path.into(),
            ipfs: None,
            added: Utc::now(),
        }
    }

    pub fn with_track(mut self, track: u32) -> Self {
        self.track = track;
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Directory containing the item's file, if it has one
    pub fn dir(&self) -> Option<PathBuf> {
        if self.path.is_empty() {
            return None;
        }
        Path::new(&self.path).parent().map(Path::to_path_buf)
    }

    /// Copy of this item without row ids, ready to insert elsewhere
    pub fn detached(&self) -> Self {
        Self {
            id: None,
            album_id: None,
            ..self.clone()
        }
    }
}

/// A collection of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    /// Row id (None until inserted)
    pub id: Option<i64>,

    pub album: String,
    pub albumartist: String,
    pub year: Option<i32>,

    /// MusicBrainz release id, the stable identity key across libraries
    pub mb_albumid: Option<String>,

    /// Cover art path (empty when none)
    pub artpath: String,

    /// Content identifier once published
    pub ipfs: Option<String>,

    pub added: DateTime<Utc>,
}

impl Album {
    /// Create a new album
    pub fn new(album: impl Into<String>, albumartist: impl Into<String>) -> Self {
        Self {
            id: None,
            album: album.into(),
            albumartist: albumartist.into(),
            year: None,
            mb_albumid: None,
            artpath: String::new(),
            ipfs: None,
            added: Utc::now(),
        }
    }

    pub fn with_mb_albumid(mut self, id: impl Into<String>) -> Self {
        self.mb_albumid = Some(id.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Whether the album already carries a non-empty content identifier
    pub fn is_published(&self) -> bool {
        self.ipfs.as_deref().is_some_and(|cid| !cid.is_empty())
    }

    /// Copy of this album without its row id
    pub fn detached(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }

    /// Read a field by name, as used by queries and display templates.
    ///
    /// Returns None for unknown fields and for unset optional fields.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.map(|id| id.to_string()),
            "album" => Some(self.album.clone()),
            "albumartist" => Some(self.albumartist.clone()),
            "year" => self.year.map(|y| y.to_string()),
            "mb_albumid" => self.mb_albumid.clone(),
            "artpath" => Some(self.artpath.clone()),
            "ipfs" => self.ipfs.clone(),
            "added" => Some(self.added.format("%Y-%m-%d %H:%M:%S").to_string()),
            _ => None,
        }
    }
}

/// Names of album fields a query may address
pub const ALBUM_FIELDS: &[&str] = &[
    "id",
    "album",
    "albumartist",
    "year",
    "mb_albumid",
    "artpath",
    "ipfs",
    "added",
];
