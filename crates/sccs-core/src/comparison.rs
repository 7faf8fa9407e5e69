//! File comparison and diff generation
//!
//! This module provides read-only analysis of items:
//! - Content addressing via SHA-256 hashing of files and directory trees
//! - Modification times for status display and the ledger
//! - Visual diffs between the local and repository side of an item
//! - Added/modified/removed summaries for directory items

mod diff;
mod directory;
mod hash;
mod timestamp;

pub(crate) use diff::read_text;
pub use diff::DiffGenerator;
pub use directory::{DirectoryComparator, DirectoryComparison};
pub use hash::{content_hash, directory_hash, file_hash, ContentHash};
pub use timestamp::mtime;
