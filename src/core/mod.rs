//! Core library operations.
//!
//! This module contains:
//! - add: publish album directories and record their identifiers
//! - get: fetch content and import it
//! - publish: export the published part of the library
//! - remote: merge fetched libraries into joined.db and list them
//! - Shelf: ties the operations to a library and daemon

pub mod add;
pub mod get;
pub mod publish;
pub mod remote;
pub mod shelf;

// Re-export commonly used types
pub use add::{add_album, assign_cids, Assignment};
pub use get::get_and_import;
pub use publish::{export_published, publish, ExportSummary};
pub use remote::{format_lines, import_remote, list_joined, merge_library, MergeReport};
pub use shelf::Shelf;
