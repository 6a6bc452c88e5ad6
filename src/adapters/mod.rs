//! Adapter interfaces for external systems.
//!
//! The only external system is the IPFS daemon, driven through its CLI.

pub mod ipfs;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use ipfs::IpfsCli;

/// Errors from a daemon invocation
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}: {output}")]
    Failed {
        command: String,
        code: i32,
        output: String,
    },
}

impl DaemonError {
    /// Captured process output, if the process ran
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } => Some(output),
            Self::Spawn { .. } => None,
        }
    }
}

/// Captured output of a successful daemon invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonOutput {
    /// Trimmed, non-empty output lines in print order
    pub lines: Vec<String>,
}

impl DaemonOutput {
    /// Split raw process output into lines
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A content-addressing daemon
#[async_trait]
pub trait Daemon: Send + Sync {
    /// Human-readable daemon name
    fn name(&self) -> &str;

    /// Directory `get` writes fetched content into
    fn work_dir(&self) -> &Path;

    /// `add -q -r <dir>`: one identifier per file, then the directory's own
    async fn add_recursive(&self, dir: &Path) -> Result<DaemonOutput, DaemonError>;

    /// `add -q <file>`: the file's identifier
    async fn add_file(&self, file: &Path) -> Result<DaemonOutput, DaemonError>;

    /// `get <cid>`: fetch into `work_dir/<cid>`, stderr merged into the output
    async fn get(&self, cid: &str) -> Result<DaemonOutput, DaemonError>;

    /// `get <cid> -o <dest>`: fetch to an explicit path
    async fn get_to(&self, cid: &str, dest: &Path) -> Result<DaemonOutput, DaemonError>;
}
