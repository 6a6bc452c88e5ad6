//! Music library records and storage.
//!
//! # Storage Layout
//!
//! ```text
//! <library dir>/
//! ├── library.db                # primary library
//! └── remotes/
//!     ├── <name>.db             # fetched remote libraries
//!     └── joined.db             # all remotes merged
//! ```

pub mod format;
pub mod importer;
pub mod models;
pub mod query;
pub mod store;

pub use format::{format_album, DEFAULT_ALBUM_FORMAT};
pub use importer::{DirectoryImporter, ImportSession, ImportSummary};
pub use models::{Album, Item};
pub use query::{Query, QueryError};
pub use store::{MetadataStore, SqliteLibrary};
