//! Command-line interface for shelf.
//!
//! `shelf ipfs` carries the IPFS operations as combinable flags; the other
//! commands manage the primary library.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::Shelf;

/// shelf - share a music library over IPFS
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Library database file (overrides config)
    #[arg(long, global = true, env = "SHELF_LIBRARY")]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interact with ipfs
    Ipfs(IpfsArgs),

    /// Import audio files from disk into the library
    Import {
        /// Files or directories to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List albums in the library
    Ls {
        /// Query terms (e.g. `album:blue miles`)
        query: Vec<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Flags for `shelf ipfs`; several may be given and run in order
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct IpfsArgs {
    /// Add albums matching the query to ipfs
    #[arg(short, long)]
    pub add: bool,

    /// Get a CID from ipfs and import it
    #[arg(short, long)]
    pub get: bool,

    /// Publish local library to ipfs
    #[arg(short, long)]
    pub publish: bool,

    /// Import remote library from ipfs: <cid> [label]
    #[arg(short, long)]
    pub import: bool,

    /// List imported library
    #[arg(short, long)]
    pub list: bool,

    /// Query, CID or label, depending on the flags
    pub args: Vec<String>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let resolved = config::config()?.clone().with_library(self.library);

        match self.command {
            Commands::Ipfs(args) => run_ipfs(&resolved, &args).await,
            Commands::Import { paths } => import_paths(&resolved, &paths),
            Commands::Ls { query } => list_library(&resolved, &query),
            Commands::Config => show_config(&resolved),
        }
    }
}

/// Run the requested ipfs operations in flag order
async fn run_ipfs(config: &ResolvedConfig, args: &IpfsArgs) -> Result<()> {
    let shelf = Shelf::from_config(config)?;
    run_ipfs_with(&shelf, args).await
}

/// Dispatch ipfs flags against an existing shelf
pub async fn run_ipfs_with(shelf: &Shelf, args: &IpfsArgs) -> Result<()> {
    if !(args.add || args.get || args.publish || args.import || args.list) {
        anyhow::bail!("Nothing to do. Pass one or more of --add, --get, --publish, --import, --list");
    }

    if args.add {
        shelf.add(&args.args).await?;
    }

    if args.get && !shelf.get(&args.args).await? {
        eprintln!("ipfs get failed, see log for details");
    }

    if args.publish {
        if let Some(cid) = shelf.publish().await? {
            println!("{}", cid);
        }
    }

    if args.import {
        let report = shelf.import(&args.args).await?;
        eprintln!(
            "Merged {} album(s), skipped {} already present",
            report.merged, report.skipped
        );
    }

    if args.list {
        for line in shelf.list(&args.args)? {
            println!("{}", line);
        }
    }

    Ok(())
}

/// Import files into the primary library
fn import_paths(config: &ResolvedConfig, paths: &[PathBuf]) -> Result<()> {
    let shelf = Shelf::from_config(config)?;
    let summary = shelf.import_paths(paths)?;
    println!("Imported {} album(s), {} item(s)", summary.albums, summary.items);
    Ok(())
}

/// List primary-library albums
fn list_library(config: &ResolvedConfig, query: &[String]) -> Result<()> {
    let shelf = Shelf::from_config(config)?;
    let lines = shelf.list_library(query)?;

    if lines.is_empty() {
        println!("No albums found");
        return Ok(());
    }

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Home:         {}", config.home.display());
    println!("Library:      {}", config.library.display());
    println!("Music dir:    {}", config.directory.display());
    println!("Album format: {}", config.format_album);
    println!("ipfs binary:  {}", config.ipfs_binary);
    match &config.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none, using defaults)"),
    }
    Ok(())
}
