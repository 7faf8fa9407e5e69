//! Error types for sccs-core

use std::io;
use std::path::PathBuf;

/// Result type for sccs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
///
/// Used by the orchestrator and the CLI to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source vanished between discovery and execution
    NotFound,
    /// File could not be read or decoded
    MalformedContent,
    /// Any other I/O failure on copy/delete/write
    PermissionDenied,
    /// Ledger could not be read or written
    LedgerCorrupt,
    /// A conflict reached execution without a resolution
    ConflictUnresolved,
    /// Invalid configuration or pattern
    Config,
}

/// Errors that can occur in sccs-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path that was expected to exist is missing
    #[error("Not found: {path}")]
    NotFound {
        /// Missing path
        path: PathBuf,
    },

    /// Content exists but has the wrong shape or encoding
    #[error("Cannot read {path}: {reason}")]
    MalformedContent {
        /// Offending path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Any other filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was working on
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The sync state ledger could not be saved
    #[error("Failed to write ledger {path}: {reason}")]
    LedgerWrite {
        /// Ledger file
        path: PathBuf,
        /// Serialization or I/O failure
        reason: String,
    },

    /// A conflict action was handed to the executor
    #[error("Conflict for '{name}' must be resolved before execution")]
    UnresolvedConflict {
        /// Item name
        name: String,
    },

    /// An include or exclude pattern does not compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern {
        /// The pattern as written
        pattern: String,
        /// Parser message
        reason: String,
    },

    /// The configuration failed validation
    #[error("Invalid configuration: {message}")]
    Config {
        /// First problem found
        message: String,
    },

    /// The configuration file is not valid YAML for the model
    #[error("Failed to parse configuration {path}: {reason}")]
    ConfigParse {
        /// Configuration file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A category name that is not in the configuration
    #[error("Category '{name}' not found")]
    UnknownCategory {
        /// Requested name
        name: String,
    },

    /// An interactive prompt could not be shown or read
    #[error("Prompt failed: {reason}")]
    Prompt {
        /// Terminal error
        reason: String,
    },
}

impl Error {
    /// Wrap an I/O error with the path it happened at
    ///
    /// `NotFound` I/O errors are mapped to [`Error::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MalformedContent { .. } => ErrorKind::MalformedContent,
            Self::Io { .. } => ErrorKind::PermissionDenied,
            Self::LedgerWrite { .. } => ErrorKind::LedgerCorrupt,
            Self::UnresolvedConflict { .. } | Self::Prompt { .. } => {
                ErrorKind::ConflictUnresolved
            }
            Self::Pattern { .. }
            | Self::Config { .. }
            | Self::ConfigParse { .. }
            | Self::UnknownCategory { .. } => ErrorKind::Config,
        }
    }
}
