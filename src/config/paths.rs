//! Canonical paths for remote libraries.
//!
//! Everything lives under a `remotes/` directory beside the primary
//! library file:
//!
//! | Path | Purpose |
//! |------|---------|
//! | `remotes/<name>.db` | one fetched remote library per label |
//! | `remotes/joined.db` | all remote libraries merged |

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Directory name for fetched remote libraries
pub const REMOTES_DIR: &str = "remotes";

/// Label reserved for the combined library
pub const JOINED_NAME: &str = "joined";

/// Directory containing the primary library file
pub fn library_root(library: &Path) -> PathBuf {
    library
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// The remotes directory (<library dir>/remotes)
pub fn remotes_dir(library: &Path) -> PathBuf {
    library_root(library).join(REMOTES_DIR)
}

/// The combined library (<library dir>/remotes/joined.db)
pub fn joined_db(library: &Path) -> PathBuf {
    remotes_dir(library).join(format!("{}.db", JOINED_NAME))
}

/// Reject names that are not a single plain path component
pub fn single_component<'a>(name: &'a str, what: &str) -> Result<&'a str> {
    if name.is_empty() || name == "." || name == ".." {
        anyhow::bail!("Invalid {}: '{}'", what, name);
    }
    if name.contains('/') || name.contains('\\') {
        anyhow::bail!("{} may not contain path separators: '{}'", what, name);
    }
    Ok(name)
}

/// A fetched remote library (<library dir>/remotes/<name>.db).
///
/// Labels must be a single path component and may not shadow joined.db.
pub fn remote_db(library: &Path, name: &str) -> Result<PathBuf> {
    let name = single_component(name, "remote library name")?;
    if name == JOINED_NAME {
        anyhow::bail!("Remote library name '{}' is reserved", JOINED_NAME);
    }

    Ok(remotes_dir(library).join(format!("{}.db", name)))
}
