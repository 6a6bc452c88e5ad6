//! Publishing the shareable part of the library.
//!
//! Only albums that already carry an identifier are exported, and every
//! local path is blanked so the exported file reveals nothing about the
//! publisher's filesystem.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::Daemon;
use crate::library::{MetadataStore, Query, SqliteLibrary};

/// Counts of exported records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub albums: usize,
    pub items: usize,
}

/// Copy published albums and their items into `dst` with paths cleared
pub fn export_published(src: &dyn MetadataStore, dst: &dyn MetadataStore) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();

    for album in src.albums(&Query::all())? {
        if !album.is_published() {
            continue;
        }

        let items: Vec<_> = src
            .album_items(&album)?
            .into_iter()
            .map(|mut item| {
                item.path = String::new();
                item
            })
            .collect();

        let mut album = album;
        album.artpath = String::new();

        dst.copy_album(&album, &items)?;
        summary.albums += 1;
        summary.items += items.len();
    }

    Ok(summary)
}

/// Export into a temporary library file and add that file to IPFS.
///
/// The temporary file is removed when this returns, on every path.
pub async fn publish(daemon: &dyn Daemon, lib: &dyn MetadataStore) -> Result<Option<String>> {
    let tmp = tempfile::Builder::new()
        .prefix("shelf-export-")
        .suffix(".db")
        .tempfile()
        .context("Failed to create temporary export library")?;

    {
        let export = SqliteLibrary::open(tmp.path())?;
        let summary = export_published(lib, &export)?;
        info!(albums = summary.albums, items = summary.items, "Exported published albums");
    }

    let output = daemon
        .add_file(tmp.path())
        .await
        .context("Failed to add exported library to ipfs")?;

    let cid = output.first_line().map(str::to_string);
    match &cid {
        Some(cid) => info!("hash of library: {}", cid),
        None => warn!("ipfs printed no identifier for the exported library"),
    }

    Ok(cid)
}
