//! Configuration for shelf paths and behaviour.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SHELF_HOME, SHELF_LIBRARY, SHELF_MUSIC_DIR, SHELF_IPFS)
//! 2. Config file (.shelf/config.yaml)
//! 3. Defaults (~/.shelf)
//!
//! Config file discovery:
//! - Searches current directory and parents for .shelf/config.yaml
//! - Paths in config file are relative to the .shelf/ directory

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::DEFAULT_ALBUM_FORMAT;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Album display template for listings
    pub format_album: Option<String>,
    #[serde(default)]
    pub ipfs: Option<IpfsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to config file)
    pub home: Option<String>,
    /// Primary library database file
    pub library: Option<String>,
    /// Where imported music is copied
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpfsConfig {
    /// ipfs binary name or path
    pub binary: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to shelf home
    pub home: PathBuf,
    /// Primary library database file
    pub library: PathBuf,
    /// Music directory for imported files
    pub directory: PathBuf,
    /// Album display template
    pub format_album: String,
    /// ipfs binary
    pub ipfs_binary: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Replace the library path (command-line override)
    pub fn with_library(mut self, library: Option<PathBuf>) -> Self {
        if let Some(library) = library {
            self.library = library;
        }
        self
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".shelf").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().map(PathBuf::from)
}

/// Merge a parsed config file (or none) with env vars and defaults
fn resolve(config: Option<ConfigFile>, config_file: Option<PathBuf>) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".shelf");

    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let paths = config.as_ref().map(|c| c.paths.clone()).unwrap_or_default();

    let home = env_path("SHELF_HOME")
        .or_else(|| paths.home.as_deref().map(|p| resolve_path(&base_dir, p)))
        .unwrap_or(default_home);

    let library = env_path("SHELF_LIBRARY")
        .or_else(|| paths.library.as_deref().map(|p| resolve_path(&base_dir, p)))
        .unwrap_or_else(|| home.join("library.db"));

    let directory = env_path("SHELF_MUSIC_DIR")
        .or_else(|| paths.directory.as_deref().map(|p| resolve_path(&base_dir, p)))
        .unwrap_or_else(|| home.join("music"));

    let format_album = config
        .as_ref()
        .and_then(|c| c.format_album.clone())
        .unwrap_or_else(|| DEFAULT_ALBUM_FORMAT.to_string());

    let ipfs_binary = std::env::var("SHELF_IPFS")
        .ok()
        .or_else(|| {
            config
                .as_ref()
                .and_then(|c| c.ipfs.as_ref())
                .and_then(|i| i.binary.clone())
        })
        .unwrap_or_else(|| "ipfs".to_string());

    Ok(ResolvedConfig {
        home,
        library,
        directory,
        format_album,
        ipfs_binary,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let config = config_file.as_deref().map(load_config_file).transpose()?;
    resolve(config, config_file)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_is_clean() -> bool {
        ["SHELF_HOME", "SHELF_LIBRARY", "SHELF_MUSIC_DIR", "SHELF_IPFS"]
            .iter()
            .all(|v| std::env::var(v).is_err())
    }

    #[test]
    fn test_defaults_without_file() {
        if !env_is_clean() {
            return;
        }
        let config = resolve(None, None).unwrap();

        let expected_home = dirs::home_dir().unwrap().join(".shelf");
        assert_eq!(config.home, expected_home);
        assert_eq!(config.library, expected_home.join("library.db"));
        assert_eq!(config.directory, expected_home.join("music"));
        assert_eq!(config.format_album, DEFAULT_ALBUM_FORMAT);
        assert_eq!(config.ipfs_binary, "ipfs");
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let shelf_dir = temp.path().join(".shelf");
        std::fs::create_dir_all(&shelf_dir).unwrap();

        let config_path = shelf_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1"
paths:
  library: ./library.db
  directory: /srv/music
format_album: "$album ($year)"
ipfs:
  binary: /usr/local/bin/ipfs
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.paths.library, Some("./library.db".to_string()));
        assert_eq!(config.format_album, Some("$album ($year)".to_string()));

        if !env_is_clean() {
            return;
        }
        let resolved = resolve(Some(config), Some(config_path)).unwrap();
        assert_eq!(resolved.directory, PathBuf::from("/srv/music"));
        assert!(resolved.library.ends_with("library.db"));
        assert!(resolved.library.starts_with(&shelf_dir) || resolved.library.is_absolute());
        assert_eq!(resolved.format_album, "$album ($year)");
        assert_eq!(resolved.ipfs_binary, "/usr/local/bin/ipfs");
    }

    #[test]
    fn test_library_override() {
        let config = ResolvedConfig {
            home: PathBuf::from("/test/.shelf"),
            library: PathBuf::from("/test/.shelf/library.db"),
            directory: PathBuf::from("/test/music"),
            format_album: DEFAULT_ALBUM_FORMAT.to_string(),
            ipfs_binary: "ipfs".to_string(),
            config_file: None,
        };

        let same = config.clone().with_library(None);
        assert_eq!(same.library, PathBuf::from("/test/.shelf/library.db"));

        let other = config.with_library(Some(PathBuf::from("/elsewhere/lib.db")));
        assert_eq!(other.library, PathBuf::from("/elsewhere/lib.db"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project/.shelf");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            resolve_path(&base, "../sibling"),
            PathBuf::from("/home/user/project/.shelf/../sibling")
        );
    }
}
