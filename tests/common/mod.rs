//! Shared test fixtures: a scripted daemon and a recording import session.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use ipfs_shelf::adapters::{Daemon, DaemonError, DaemonOutput};
use ipfs_shelf::library::{
    Album, ImportSession, ImportSummary, Item, MetadataStore, SqliteLibrary,
};

#[derive(Default)]
struct State {
    add_lines: Vec<String>,
    fail_add: bool,
    file_cid: Option<String>,
    fail_add_file: bool,
    fail_get: bool,
    trees: HashMap<String, Vec<(String, Vec<u8>)>>,
    remote_dbs: HashMap<String, PathBuf>,
    calls: Vec<Vec<String>>,
}

/// Daemon stand-in that replays canned output and records every call
#[derive(Clone)]
pub struct ScriptedDaemon {
    work_dir: PathBuf,
    state: Arc<Mutex<State>>,
}

impl ScriptedDaemon {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Lines printed by `add -q -r`
    pub fn with_add_output(self, lines: &[&str]) -> Self {
        self.state.lock().unwrap().add_lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn failing_add(self) -> Self {
        self.state.lock().unwrap().fail_add = true;
        self
    }

    /// Line printed by `add -q <file>`
    pub fn with_file_cid(self, cid: &str) -> Self {
        self.state.lock().unwrap().file_cid = Some(cid.to_string());
        self
    }

    pub fn failing_add_file(self) -> Self {
        self.state.lock().unwrap().fail_add_file = true;
        self
    }

    pub fn failing_get(self) -> Self {
        self.state.lock().unwrap().fail_get = true;
        self
    }

    /// Files `get <cid>` writes under `work_dir/<cid>`
    pub fn with_tree(self, cid: &str, files: &[(&str, &[u8])]) -> Self {
        self.state.lock().unwrap().trees.insert(
            cid.to_string(),
            files.iter().map(|(n, b)| (n.to_string(), b.to_vec())).collect(),
        );
        self
    }

    /// Library file `get <cid> -o <dest>` copies to dest
    pub fn with_remote_db(self, cid: &str, source: &Path) -> Self {
        self.state
            .lock()
            .unwrap()
            .remote_dbs
            .insert(cid.to_string(), source.to_path_buf());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Copy of the last file passed to `add -q <file>`
    pub fn published_copy(&self) -> PathBuf {
        self.work_dir.join("published-copy.db")
    }

    fn record(&self, args: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(args.iter().map(|a| a.to_string()).collect());
    }

    fn failure(command: String) -> DaemonError {
        DaemonError::Failed {
            command,
            code: 1,
            output: "Error: merkledag: not found".to_string(),
        }
    }
}

#[async_trait]
impl Daemon for ScriptedDaemon {
    fn name(&self) -> &str {
        "scripted"
    }

    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn add_recursive(&self, dir: &Path) -> Result<DaemonOutput, DaemonError> {
        let dir = dir.to_string_lossy().into_owned();
        self.record(&["add", "-q", "-r", dir.as_str()]);

        let state = self.state.lock().unwrap();
        if state.fail_add {
            return Err(Self::failure(format!("ipfs add -q -r {}", dir)));
        }
        Ok(DaemonOutput {
            lines: state.add_lines.clone(),
        })
    }

    async fn add_file(&self, file: &Path) -> Result<DaemonOutput, DaemonError> {
        let path = file.to_string_lossy().into_owned();
        self.record(&["add", "-q", path.as_str()]);

        let state = self.state.lock().unwrap();
        if state.fail_add_file {
            return Err(Self::failure(format!("ipfs add -q {}", path)));
        }
        std::fs::copy(file, self.published_copy()).expect("copy published file");
        Ok(DaemonOutput {
            lines: state.file_cid.iter().cloned().collect(),
        })
    }

    async fn get(&self, cid: &str) -> Result<DaemonOutput, DaemonError> {
        self.record(&["get", cid]);

        let state = self.state.lock().unwrap();
        if state.fail_get {
            return Err(Self::failure(format!("ipfs get {}", cid)));
        }

        let root = self.work_dir.join(cid);
        std::fs::create_dir_all(&root).expect("create fetched dir");
        for (name, bytes) in state.trees.get(cid).into_iter().flatten() {
            std::fs::write(root.join(name), bytes).expect("write fetched file");
        }
        Ok(DaemonOutput::default())
    }

    async fn get_to(&self, cid: &str, dest: &Path) -> Result<DaemonOutput, DaemonError> {
        let dest_str = dest.to_string_lossy().into_owned();
        self.record(&["get", cid, "-o", dest_str.as_str()]);

        let state = self.state.lock().unwrap();
        match state.remote_dbs.get(cid) {
            Some(source) => {
                std::fs::copy(source, dest).expect("copy remote library");
                Ok(DaemonOutput::default())
            }
            None => Err(Self::failure(format!("ipfs get {} -o {}", cid, dest.display()))),
        }
    }
}

/// Import session that only records the paths it was given
#[derive(Clone, Default)]
pub struct RecordingImporter {
    runs: Arc<Mutex<Vec<(PathBuf, bool)>>>,
    fail: bool,
}

impl RecordingImporter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// (path, existed at import time) for every imported path
    pub fn runs(&self) -> Vec<(PathBuf, bool)> {
        self.runs.lock().unwrap().clone()
    }
}

impl ImportSession for RecordingImporter {
    fn run(&self, _lib: &dyn MetadataStore, paths: &[PathBuf]) -> Result<ImportSummary> {
        let mut runs = self.runs.lock().unwrap();
        for path in paths {
            runs.push((path.clone(), path.exists()));
        }
        if self.fail {
            anyhow::bail!("import session aborted");
        }
        Ok(ImportSummary::default())
    }
}

/// Insert an album with items at `<dir>/<nn> <title>.flac`
pub fn seed_album(
    lib: &SqliteLibrary,
    album: Album,
    dir: Option<&str>,
    titles: &[&str],
) -> Album {
    let mut album = album;
    lib.add_album(&mut album).unwrap();

    for (idx, title) in titles.iter().enumerate() {
        let track = idx as u32 + 1;
        let path = dir
            .map(|d| format!("{}/{:02} {}.flac", d, track, title))
            .unwrap_or_default();
        let mut item = Item::new(*title, path).with_track(track);
        item.album = album.album.clone();
        item.album_id = album.id;
        lib.add_item(&mut item).unwrap();
    }

    album
}

/// Write a standalone library file holding one album per (key, title)
pub fn remote_library(path: &Path, albums: &[(&str, &str)]) {
    let lib = SqliteLibrary::open(path).unwrap();
    for (key, title) in albums {
        let mut album = Album::new(*title, "Remote Artist").with_mb_albumid(*key);
        album.ipfs = Some(format!("Qm{}", title.replace(' ', "")));
        seed_album(&lib, album, None, &["one", "two"]);
    }
}
