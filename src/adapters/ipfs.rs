//! IPFS adapter using subprocess mode.
//!
//! Calls the `ipfs` CLI directly and waits for it to exit. There is no
//! timeout: an unresponsive daemon blocks the caller.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Daemon, DaemonError, DaemonOutput};

/// IPFS daemon driven through its CLI
pub struct IpfsCli {
    /// Path to the ipfs binary (default: "ipfs")
    binary_path: String,

    /// Working directory for spawned processes
    work_dir: PathBuf,
}

impl Default for IpfsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl IpfsCli {
    /// Create an adapter for `ipfs` on PATH, running in the current directory
    pub fn new() -> Self {
        Self::with_binary_path("ipfs")
    }

    /// Create an adapter with a custom binary path
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            work_dir: PathBuf::from("."),
        }
    }

    /// Run spawned processes in `work_dir`
    pub fn in_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Run the binary and collect output.
    ///
    /// With `merge_stderr`, stderr is appended to stdout in the captured text.
    async fn run(&self, args: Vec<OsString>, merge_stderr: bool) -> Result<String, DaemonError> {
        let command = format!(
            "{} {}",
            self.binary_path,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        debug!(%command, "Running ipfs");

        let output = Command::new(&self.binary_path)
            .args(&args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| DaemonError::Spawn {
                binary: self.binary_path.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if merge_stderr {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        if !output.status.success() {
            let output_text = if merge_stderr {
                text
            } else {
                String::from_utf8_lossy(&output.stderr).into_owned()
            };
            return Err(DaemonError::Failed {
                command,
                code: output.status.code().unwrap_or(-1),
                output: output_text.trim().to_string(),
            });
        }

        Ok(text)
    }
}

fn add_recursive_args(dir: &Path) -> Vec<OsString> {
    vec!["add".into(), "-q".into(), "-r".into(), dir.into()]
}

fn add_file_args(file: &Path) -> Vec<OsString> {
    vec!["add".into(), "-q".into(), file.into()]
}

fn get_args(cid: &str) -> Vec<OsString> {
    vec!["get".into(), cid.into()]
}

fn get_to_args(cid: &str, dest: &Path) -> Vec<OsString> {
    vec!["get".into(), cid.into(), "-o".into(), dest.into()]
}

#[async_trait]
impl Daemon for IpfsCli {
    fn name(&self) -> &str {
        "ipfs"
    }

    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn add_recursive(&self, dir: &Path) -> Result<DaemonOutput, DaemonError> {
        let text = self.run(add_recursive_args(dir), false).await?;
        Ok(DaemonOutput::from_text(&text))
    }

    async fn add_file(&self, file: &Path) -> Result<DaemonOutput, DaemonError> {
        let text = self.run(add_file_args(file), false).await?;
        Ok(DaemonOutput::from_text(&text))
    }

    async fn get(&self, cid: &str) -> Result<DaemonOutput, DaemonError> {
        let text = self.run(get_args(cid), true).await?;
        Ok(DaemonOutput::from_text(&text))
    }

    async fn get_to(&self, cid: &str, dest: &Path) -> Result<DaemonOutput, DaemonError> {
        let text = self.run(get_to_args(cid, dest), true).await?;
        Ok(DaemonOutput::from_text(&text))
    }
}
