//! Fetching content from IPFS and importing it.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::adapters::Daemon;
use crate::config::paths;
use crate::library::{ImportSession, MetadataStore};

/// Fetch `args[0]` and run the import session on it.
///
/// Returns false, without importing or deleting anything, when the
/// daemon fails. The fetched tree is removed only after a successful
/// import. The identifier must be a bare CID: `ipfs get` names its output
/// after the last path segment, so path forms would import the wrong tree.
pub async fn get_and_import(
    daemon: &dyn Daemon,
    lib: &dyn MetadataStore,
    importer: &dyn ImportSession,
    args: &[String],
) -> Result<bool> {
    let Some(cid) = args.first() else {
        anyhow::bail!("ipfs get needs a content identifier");
    };
    paths::single_component(cid, "content identifier")?;
    if args.len() > 1 {
        warn!(ignored = ?&args[1..], "Only the first identifier is fetched");
    }

    if let Err(err) = daemon.get(cid).await {
        let detail = err
            .output()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        error!("Failed to get {} from ipfs.\n{}", cid, detail);
        return Ok(false);
    }

    info!("Getting {} from ipfs", cid);
    let fetched = daemon.work_dir().join(cid);
    let summary = importer.run(lib, std::slice::from_ref(&fetched))?;
    info!(albums = summary.albums, items = summary.items, "Imported fetched content");

    remove_fetched(&fetched)?;
    Ok(true)
}

fn remove_fetched(path: &Path) -> Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    } else if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}
