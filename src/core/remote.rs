//! Remote libraries: fetching, merging into joined.db, and listing.
//!
//! Albums are deduplicated by MusicBrainz release id only. The first
//! library to bring a given id wins; later albums with the same id are
//! skipped without comparing any other field.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::Daemon;
use crate::config::paths;
use crate::library::{format_album, MetadataStore, Query, SqliteLibrary};

/// Outcome of merging one remote library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged: usize,
    pub skipped: usize,
}

/// Merge every album of `remote` whose identity key `joined` lacks
pub fn merge_library(remote: &dyn MetadataStore, joined: &dyn MetadataStore) -> Result<MergeReport> {
    let mut report = MergeReport::default();

    for album in remote.albums(&Query::all())? {
        if joined.has_album_key(album.mb_albumid.as_deref())? {
            report.skipped += 1;
            continue;
        }

        let items = remote.album_items(&album)?;
        joined.copy_album(&album, &items)?;
        report.merged += 1;
    }

    Ok(report)
}

/// Fetch a remote library into `remotes/<name>.db` and merge it into joined.db
pub async fn import_remote(
    daemon: &dyn Daemon,
    library: &Path,
    cid: &str,
    label: Option<&str>,
) -> Result<MergeReport> {
    let name = label.unwrap_or(cid);
    let remote_path = paths::remote_db(library, name)?;

    let remotes = paths::remotes_dir(library);
    if !remotes.exists() {
        std::fs::create_dir_all(&remotes)
            .with_context(|| format!("Failed to create {}", remotes.display()))?;
    }

    // A failed fetch is not fatal; whatever is at the path gets merged
    if let Err(err) = daemon.get_to(cid, &remote_path).await {
        warn!(%cid, error = %err, "ipfs get reported a failure");
    }

    let joined = SqliteLibrary::open(paths::joined_db(library))?;
    let remote = SqliteLibrary::open(&remote_path)?;

    let report = merge_library(&remote, &joined)?;
    info!(
        remote = %name,
        merged = report.merged,
        skipped = report.skipped,
        "Merged remote library"
    );

    Ok(report)
}

/// Render the joined library's albums as `<template> : <cid>` lines
pub fn list_joined(library: &Path, query: &Query, template: &str) -> Result<Vec<String>> {
    let joined_path = paths::joined_db(library);
    if !joined_path.exists() {
        info!("No remote libraries imported yet");
        return Ok(Vec::new());
    }

    let joined = SqliteLibrary::open_read_only(&joined_path)?;
    format_lines(&joined, query, template)
}

/// Format matching albums of any store with their identifiers
pub fn format_lines(store: &dyn MetadataStore, query: &Query, template: &str) -> Result<Vec<String>> {
    Ok(store
        .albums(query)?
        .iter()
        .map(|album| {
            format!(
                "{} : {}",
                format_album(album, template),
                album.ipfs.as_deref().unwrap_or_default()
            )
        })
        .collect())
}
