//! ipfs-shelf - share a music library over IPFS
//!
//! Albums in a local SQLite library are added to IPFS through the `ipfs`
//! CLI, and the resulting content identifiers are stored on the album and
//! item records. The identified part of the library can be published as a
//! small database file; other people's published libraries can be fetched
//! and merged into a single combined library.
//!
//! # Modules
//!
//! - `adapters`: The IPFS daemon, driven through its CLI
//! - `library`: Records, queries, display templates, SQLite storage
//! - `core`: The add, get, publish, import and list operations
//! - `config`: Configuration and path layout
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Add albums to ipfs
//! shelf ipfs --add album:blue
//!
//! # Publish the added part of the library
//! shelf ipfs --publish
//!
//! # Merge a friend's library and list it
//! shelf ipfs --import QmHash friend
//! shelf ipfs --list
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod library;

// Re-export main types at crate root for convenience
pub use adapters::{Daemon, DaemonError, DaemonOutput, IpfsCli};
pub use core::{MergeReport, Shelf};
pub use library::{Album, Item, MetadataStore, Query, SqliteLibrary};
