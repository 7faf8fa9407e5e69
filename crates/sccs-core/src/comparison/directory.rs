//! Directory comparison for directory items
//!
//! Summarizes which files differ between the local and repository copy of a
//! directory item.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::hash::file_hash;
use crate::error::{Error, Result};

/// Result of comparing the two copies of a directory item
///
/// Paths are relative to the item root. "Added" means present locally but not
/// in the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryComparison {
    /// Files only on the local side
    pub added: Vec<PathBuf>,
    /// Files with different content on each side
    pub modified: Vec<PathBuf>,
    /// Files only on the repository side
    pub removed: Vec<PathBuf>,
    /// Files with identical content
    pub unchanged: Vec<PathBuf>,
}

impl DirectoryComparison {
    /// Check if directories are identical (no changes)
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Count total number of changes
    #[must_use]
    pub const fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Render a short textual summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut output = String::new();
        for path in &self.added {
            output.push_str(&format!("  + {} (local only)\n", path.display()));
        }
        for path in &self.removed {
            output.push_str(&format!("  - {} (repo only)\n", path.display()));
        }
        for path in &self.modified {
            output.push_str(&format!("  ~ {} (modified)\n", path.display()));
        }
        if output.is_empty() {
            output.push_str("  (no differences)\n");
        }
        output
    }
}

/// Directory comparator for directory items
pub struct DirectoryComparator;

impl DirectoryComparator {
    /// Compare the local and repository copies of a directory item
    ///
    /// A missing root is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if directory traversal or hashing fails.
    pub fn compare(local: &Path, repo: &Path) -> Result<DirectoryComparison> {
        let local_files = Self::collect_files(local)?;
        let repo_files = Self::collect_files(repo)?;
        let mut comparison = DirectoryComparison::default();

        for rel_path in &local_files {
            if repo_files.contains(rel_path) {
                if file_hash(&local.join(rel_path))? == file_hash(&repo.join(rel_path))? {
                    comparison.unchanged.push(rel_path.clone());
                } else {
                    comparison.modified.push(rel_path.clone());
                }
            } else {
                comparison.added.push(rel_path.clone());
            }
        }

        comparison.removed = repo_files.difference(&local_files).cloned().collect();

        Ok(comparison)
    }

    fn collect_files(dir: &Path) -> Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();
        if !dir.is_dir() {
            return Ok(files);
        }

        for entry in WalkDir::new(dir).min_depth(1) {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(dir).to_path_buf();
                Error::io(at, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(dir) {
                files.insert(rel.to_path_buf());
            }
        }
        Ok(files)
    }
}
