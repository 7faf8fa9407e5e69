//! # sccs-core
//!
//! Core library for bidirectional configuration synchronization.
//!
//! Keeps named items (files, marker directories, pinned single files) consistent
//! between a local directory tree and a mirror of it inside a repository. Changes
//! are classified against a persistent ledger of the last synchronized content
//! hash, so edits made independently on either side are detected instead of
//! silently overwritten.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

/// Atomic staged writes
pub mod atomic;

/// Content hashing, timestamps and diff rendering
pub mod comparison;

/// Configuration model, loading and validation
pub mod config;

/// Hunk-level interactive merging
pub mod merge;

/// Item discovery per category
pub mod scanner;

/// Non-destructive settings file updates
pub mod settings;

/// Bidirectional synchronization engine
pub mod sync;

pub use config::{CategoryConfig, Config, ConfigLoader, ItemType, SyncMode};
pub use error::{Error, ErrorKind, Result};
pub use sync::{
    ActionType, CallbackResolver, CategoryHandler, CategoryStatus, ConflictChoice,
    ConflictResolver, Side, SyncAction, SyncEngine, SyncItem, SyncOptions, SyncOutcome,
    SyncResult, StateManager,
};
