//! Import sessions: bringing files on disk into the library.
//!
//! The directory importer copies audio files into the music directory and
//! creates one album per source directory. It does not read tags; titles
//! come from file and directory names, track numbers from file-name order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::models::{Album, Item};
use super::store::MetadataStore;

/// File extensions treated as audio
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "opus", "m4a", "aac", "wav", "aiff", "alac", "wv", "ape",
];

/// What an import session added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub albums: usize,
    pub items: usize,
}

/// The library's standard "import these paths" flow
pub trait ImportSession {
    fn run(&self, lib: &dyn MetadataStore, paths: &[PathBuf]) -> Result<ImportSummary>;
}

/// Copies audio files into the music directory, one album per folder
pub struct DirectoryImporter {
    music_dir: PathBuf,
}

impl DirectoryImporter {
    pub fn new(music_dir: impl Into<PathBuf>) -> Self {
        Self {
            music_dir: music_dir.into(),
        }
    }

    /// Audio files under `path`, grouped by containing directory
    fn collect(path: &Path) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>> {
        let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

        let files: Vec<PathBuf> = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            let pattern = format!(
                "{}/**/*",
                glob::Pattern::escape(&path.to_string_lossy())
            );
            glob::glob(&pattern)
                .with_context(|| format!("Invalid import path: {}", path.display()))?
                .filter_map(|entry| entry.ok())
                .filter(|p| p.is_file())
                .collect()
        };

        for file in files.into_iter().filter(|f| is_audio(f)) {
            let dir = file.parent().unwrap_or(path).to_path_buf();
            groups.entry(dir).or_default().push(file);
        }

        for files in groups.values_mut() {
            files.sort();
        }

        Ok(groups)
    }

    /// Create a fresh album directory under the music dir.
    ///
    /// `<title>` is used when free, otherwise `<title>.1`, `<title>.2`, ...
    /// so albums from same-named folders never share a directory.
    fn claim_album_dir(&self, title: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.music_dir).with_context(|| {
            format!("Failed to create music dir: {}", self.music_dir.display())
        })?;

        for n in 0u32.. {
            let name = match n {
                0 => title.to_string(),
                n => format!("{}.{}", title, n),
            };
            let dir = self.music_dir.join(name);
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to create album dir: {}", dir.display()))
                }
            }
        }

        anyhow::bail!("No free album directory for '{}'", title)
    }

    fn import_group(
        &self,
        lib: &dyn MetadataStore,
        dir: &Path,
        files: &[PathBuf],
    ) -> Result<usize> {
        let title = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown Album".to_string());

        let dest_dir = self.claim_album_dir(&title)?;

        let mut album = Album::new(title.clone(), String::new());
        let album_id = lib.add_album(&mut album)?;

        for (idx, file) in files.iter().enumerate() {
            let Some(name) = file.file_name() else {
                continue;
            };
            let dest = dest_dir.join(name);
            if dest.exists() {
                anyhow::bail!("Refusing to overwrite {}", dest.display());
            }
            std::fs::copy(file, &dest).with_context(|| {
                format!("Failed to copy {} to {}", file.display(), dest.display())
            })?;

            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            let mut item = Item::new(stem, dest.to_string_lossy().into_owned())
                .with_track(idx as u32 + 1);
            item.album = title.clone();
            item.album_id = Some(album_id);
            lib.add_item(&mut item)?;
            debug!(path = %dest.display(), "Imported item");
        }

        info!(album = %title, items = files.len(), "Imported album");
        Ok(files.len())
    }
}

impl ImportSession for DirectoryImporter {
    fn run(&self, lib: &dyn MetadataStore, paths: &[PathBuf]) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for path in paths {
            if !path.exists() {
                anyhow::bail!("Import path does not exist: {}", path.display());
            }

            for (dir, files) in Self::collect(path)? {
                summary.items += self.import_group(lib, &dir, &files)?;
                summary.albums += 1;
            }
        }

        Ok(summary)
    }
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
