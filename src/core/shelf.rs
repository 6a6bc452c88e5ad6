//! Main entry point for library operations.
//!
//! Owns the daemon adapter, the primary library and the import session,
//! and runs the IPFS operations against them one at a time.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info, instrument};

use crate::adapters::{Daemon, IpfsCli};
use crate::config::ResolvedConfig;
use crate::library::{
    DirectoryImporter, ImportSession, ImportSummary, MetadataStore, Query, SqliteLibrary,
    DEFAULT_ALBUM_FORMAT,
};

use super::remote::MergeReport;
use super::{add, get, publish, remote};

/// A primary library wired to an IPFS daemon
pub struct Shelf {
    daemon: Box<dyn Daemon>,
    library: SqliteLibrary,
    importer: Box<dyn ImportSession>,
    format_album: String,
}

impl Shelf {
    /// Create a shelf from its parts
    pub fn new(
        daemon: Box<dyn Daemon>,
        library: SqliteLibrary,
        importer: Box<dyn ImportSession>,
    ) -> Self {
        Self {
            daemon,
            library,
            importer,
            format_album: DEFAULT_ALBUM_FORMAT.to_string(),
        }
    }

    /// Set the album display template
    pub fn with_format(mut self, template: impl Into<String>) -> Self {
        self.format_album = template.into();
        self
    }

    /// Open the configured library with the `ipfs` CLI and directory importer
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let library = SqliteLibrary::open(&config.library)?;
        let daemon = IpfsCli::with_binary_path(&config.ipfs_binary);
        let importer = DirectoryImporter::new(&config.directory);

        Ok(Self::new(Box::new(daemon), library, Box::new(importer))
            .with_format(&config.format_album))
    }

    pub fn library(&self) -> &SqliteLibrary {
        &self.library
    }

    /// Add every album matching the query; returns how many were added.
    ///
    /// A failing album is logged and the rest are still attempted; the
    /// call then fails, naming how many albums could not be added.
    #[instrument(skip(self))]
    pub async fn add(&self, args: &[String]) -> Result<usize> {
        let query = Query::parse(args)?;
        let mut added = 0;
        let mut failed = 0;

        for mut album in self.library.albums(&query)? {
            match add::add_album(self.daemon.as_ref(), &self.library, &mut album).await {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(err) => {
                    error!("Failed to add {} to ipfs: {:#}", album.album, err);
                    failed += 1;
                }
            }
        }

        info!(added, failed, "Finished adding albums");
        if failed > 0 {
            anyhow::bail!("{} album(s) could not be added to ipfs", failed);
        }
        Ok(added)
    }

    /// Fetch a CID and import it into the library
    #[instrument(skip(self))]
    pub async fn get(&self, args: &[String]) -> Result<bool> {
        get::get_and_import(
            self.daemon.as_ref(),
            &self.library,
            self.importer.as_ref(),
            args,
        )
        .await
    }

    /// Publish the library's already-added albums; returns the library CID
    #[instrument(skip(self))]
    pub async fn publish(&self) -> Result<Option<String>> {
        publish::publish(self.daemon.as_ref(), &self.library).await
    }

    /// Fetch and merge a remote library: `args` is `<cid> [label]`
    #[instrument(skip(self))]
    pub async fn import(&self, args: &[String]) -> Result<MergeReport> {
        let Some(cid) = args.first() else {
            anyhow::bail!("ipfs import needs a content identifier");
        };
        let label = args.get(1).map(String::as_str);

        remote::import_remote(self.daemon.as_ref(), self.library.path(), cid, label).await
    }

    /// Lines for every joined-library album matching the query
    pub fn list(&self, args: &[String]) -> Result<Vec<String>> {
        let query = Query::parse(args)?;
        remote::list_joined(self.library.path(), &query, &self.format_album)
    }

    /// Import files from disk into the primary library
    pub fn import_paths(&self, paths: &[PathBuf]) -> Result<ImportSummary> {
        self.importer.run(&self.library, paths)
    }

    /// Lines for every primary-library album matching the query
    pub fn list_library(&self, args: &[String]) -> Result<Vec<String>> {
        let query = Query::parse(args)?;
        remote::format_lines(&self.library, &query, &self.format_album)
    }
}
