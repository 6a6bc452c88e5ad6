//! Adding album directories to IPFS.
//!
//! `ipfs add -q -r <dir>` prints one identifier per file and then the
//! directory's own identifier. The last line belongs to the album; the
//! preceding lines are handed to the album's items by position.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::adapters::Daemon;
use crate::library::{Album, Item, MetadataStore};

/// Outcome of pairing daemon output with an album's items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Identifier of the album directory
    pub album_cid: String,
    /// How many leading items received an identifier
    pub items_assigned: usize,
}

/// Pair identifier lines with items by index.
///
/// Line N goes to item N in library order; the last line is the album's.
/// Matching is purely positional: if the daemon walks the directory in a
/// different order than the library sorts its items, identifiers land on
/// the wrong items. Lines beyond the item count (non-audio files in the
/// directory) are dropped; items beyond the line count keep their value.
pub fn assign_cids(lines: &[String], items: &mut [Item]) -> Option<Assignment> {
    let (album_cid, item_lines) = lines.split_last()?;

    let mut items_assigned = 0;
    for (item, cid) in items.iter_mut().zip(item_lines) {
        item.ipfs = Some(cid.clone());
        items_assigned += 1;
    }

    Some(Assignment {
        album_cid: album_cid.clone(),
        items_assigned,
    })
}

/// Add one album's directory and record the identifiers.
///
/// Returns false when the album has no directory on disk or the daemon
/// printed nothing.
pub async fn add_album(
    daemon: &dyn Daemon,
    lib: &dyn MetadataStore,
    album: &mut Album,
) -> Result<bool> {
    let Some(album_dir) = lib.album_dir(album)? else {
        debug!(album = %album.album, "Album has no directory, skipping");
        return Ok(false);
    };
    info!("Adding {} to ipfs", album_dir.display());

    let output = daemon
        .add_recursive(&album_dir)
        .await
        .with_context(|| format!("Failed to add {} to ipfs", album_dir.display()))?;

    let mut items = lib.album_items(album)?;
    let Some(assignment) = assign_cids(&output.lines, &mut items) else {
        warn!("ipfs printed no identifiers for {}", album_dir.display());
        return Ok(false);
    };

    for item in &items[..assignment.items_assigned] {
        info!("item: {}", item.ipfs.as_deref().unwrap_or_default());
        lib.store_item(item)?;
    }

    info!("album: {}", assignment.album_cid);
    album.ipfs = Some(assignment.album_cid);
    lib.store_album(album)?;

    Ok(true)
}
