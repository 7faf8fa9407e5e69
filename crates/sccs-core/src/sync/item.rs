//! Synchronizable items and the two sides they live on

use std::fmt;
use std::path::{Path, PathBuf};

use crate::comparison::{self, ContentHash};
use crate::config::PatternMatcher;
use crate::error::{Error, Result};

/// One of the two locations an item is kept in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The local directory tree
    Local,
    /// The repository mirror
    Repo,
}

impl Side {
    /// The opposite side
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Local => Self::Repo,
            Self::Repo => Self::Local,
        }
    }

    /// Lowercase name of the side
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Repo => "repo",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of an item on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A file found by scanning a category root
    File,
    /// A directory (optionally identified by a marker file)
    Directory,
    /// The single pinned file a category points at
    Single,
}

impl ItemKind {
    /// Whether the item is a directory tree
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// A named unit of synchronization
///
/// Both candidate paths are always populated; existence is checked on access.
#[derive(Debug, Clone)]
pub struct SyncItem {
    /// Name, unique within the category
    pub name: String,
    /// Owning category
    pub category: String,
    /// Shape on disk
    pub kind: ItemKind,
    local_path: PathBuf,
    repo_path: PathBuf,
    exclude: Option<PatternMatcher>,
}

impl SyncItem {
    /// Create an item from its two candidate paths
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        kind: ItemKind,
        local_path: PathBuf,
        repo_path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            kind,
            local_path,
            repo_path,
            exclude: None,
        }
    }

    /// Skip paths matched by `exclude` when hashing directory contents
    #[must_use]
    pub fn with_exclude(mut self, exclude: PatternMatcher) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// Patterns whose matches stay out of hashing and copying
    #[must_use]
    pub fn exclude(&self) -> Option<&PatternMatcher> {
        self.exclude.as_ref()
    }

    /// Candidate path on `side`
    #[must_use]
    pub fn path(&self, side: Side) -> &Path {
        match side {
            Side::Local => &self.local_path,
            Side::Repo => &self.repo_path,
        }
    }

    /// Whether the item exists on `side`
    #[must_use]
    pub fn exists(&self, side: Side) -> bool {
        self.path(side).exists()
    }

    /// Whether the item exists on at least one side
    #[must_use]
    pub fn exists_either(&self) -> bool {
        self.exists(Side::Local) || self.exists(Side::Repo)
    }

    /// Content hash on `side`, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedContent`] if the path has the wrong type for
    /// the item kind, or an I/O error if it cannot be read.
    pub fn hash(&self, side: Side) -> Result<Option<ContentHash>> {
        let path = self.path(side);
        if !path.exists() {
            return Ok(None);
        }

        if self.kind.is_directory() {
            if !path.is_dir() {
                return Err(Error::MalformedContent {
                    path: path.to_path_buf(),
                    reason: "expected a directory".to_string(),
                });
            }
            comparison::directory_hash(path, true, self.exclude.as_ref())
        } else {
            if !path.is_file() {
                return Err(Error::MalformedContent {
                    path: path.to_path_buf(),
                    reason: "expected a regular file".to_string(),
                });
            }
            comparison::file_hash(path)
        }
    }

    /// Modification time on `side`, `None` if absent
    #[must_use]
    pub fn mtime(&self, side: Side) -> Option<f64> {
        comparison::mtime(self.path(side))
    }

    /// File extension used for editor scratch files (e.g. `.md`)
    #[must_use]
    pub fn suffix(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }
}
