//! Item discovery for a sync category
//!
//! A category is scanned on both sides and the results are merged by item name:
//! - single pinned file: the category points at one file, not a directory
//! - file items: files under the category roots, filtered by patterns
//! - directory items: immediate subdirectories, optionally marked by a file
//! - mixed: both of the above, directory items winning on name collision

mod directories;
mod files;

#[cfg(test)]
mod integration_tests;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CategoryConfig, ItemType, PatternMatcher};
use crate::error::{Error, Result};
use crate::sync::{ItemKind, SyncItem};

/// Result of a scan operation with optional warnings
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Discovered items keyed by name
    pub items: BTreeMap<String, SyncItem>,
    /// Non-fatal warnings encountered during scanning
    pub warnings: Vec<String>,
}

/// Scanner for one category
pub struct Scanner<'a> {
    category_name: &'a str,
    category: &'a CategoryConfig,
    local_root: PathBuf,
    repo_root: PathBuf,
    matcher: PatternMatcher,
    exclude: PatternMatcher,
    item_pattern: Option<PatternMatcher>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for a category
    ///
    /// `repo_base` is the repository checkout; the category's `repo_path` is
    /// resolved against it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if any include/exclude pattern is invalid.
    pub fn new(
        category_name: &'a str,
        category: &'a CategoryConfig,
        repo_base: &Path,
        global_exclude: &[String],
    ) -> Result<Self> {
        let mut excludes = category.exclude.clone();
        excludes.extend(global_exclude.iter().cloned());

        let item_pattern = category
            .item_pattern
            .as_ref()
            .map(|p| PatternMatcher::with_patterns(std::slice::from_ref(p), &[]))
            .transpose()?;

        Ok(Self {
            category_name,
            category,
            local_root: category.local_path.clone(),
            repo_root: repo_base.join(&category.repo_path),
            matcher: PatternMatcher::with_patterns(&category.include, &excludes)?,
            exclude: PatternMatcher::with_patterns(&[], &excludes)?,
            item_pattern,
        })
    }

    /// Local root of the category
    #[must_use]
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// Repository root of the category
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Discover the items of this category on both sides
    ///
    /// Missing roots yield no items.
    ///
    /// # Errors
    ///
    /// Returns an error if a root exists but cannot be read.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut result = ScanResult::default();

        if self.is_single_file() {
            let Some(name) = self.local_root.file_name() else {
                return Ok(result);
            };
            let name = name.to_string_lossy().into_owned();
            let item = SyncItem::new(
                name.clone(),
                self.category_name,
                ItemKind::Single,
                self.local_root.clone(),
                self.repo_root.clone(),
            );
            if item.exists_either() {
                result.items.insert(name, item);
            }
            return Ok(result);
        }

        for root in [&self.local_root, &self.repo_root] {
            Self::check_root(root)?;
        }

        match self.category.item_type {
            ItemType::File => self.scan_files(&mut result),
            ItemType::Directory => self.scan_directories(&mut result),
            ItemType::Mixed => {
                self.scan_files(&mut result);
                self.scan_directories(&mut result);
            }
        }

        tracing::debug!(
            "Scanned category '{}': {} items, {} warnings",
            self.category_name,
            result.items.len(),
            result.warnings.len()
        );
        for warning in &result.warnings {
            tracing::warn!("{}: {warning}", self.category_name);
        }

        Ok(result)
    }

    /// Whether the category points at one pinned file rather than a directory
    #[must_use]
    pub fn is_single_file(&self) -> bool {
        if self.category.item_type != ItemType::File {
            return false;
        }
        let raw = self.category.local_path.to_string_lossy();
        if raw.contains(['*', '?', '[']) || raw.ends_with('/') || raw.ends_with('\\') {
            return false;
        }
        !self.local_root.is_dir() && !self.repo_root.is_dir()
    }

    fn check_root(root: &Path) -> Result<()> {
        if root.is_dir() {
            fs::read_dir(root).map_err(|e| Error::io(root, e))?;
        }
        Ok(())
    }

    fn scan_files(&self, result: &mut ScanResult) {
        let recursive = self.category.include.iter().any(|p| p.contains('/'));
        let filter = files::FileFilter {
            matcher: &self.matcher,
            item_pattern: self.item_pattern.as_ref(),
            recursive,
        };

        for (root, is_local) in [(&self.local_root, true), (&self.repo_root, false)] {
            for name in filter.find(root, &mut result.warnings) {
                if result.items.contains_key(&name) {
                    continue;
                }
                let item = self.make_item(&name, ItemKind::File);
                tracing::trace!(
                    "Found file item '{name}' on {} side",
                    if is_local { "local" } else { "repo" }
                );
                result.items.insert(name, item);
            }
        }
    }

    fn scan_directories(&self, result: &mut ScanResult) {
        let marker = self.category.item_marker.as_deref();

        for root in [&self.local_root, &self.repo_root] {
            for name in directories::find(root, marker, &self.matcher, &mut result.warnings) {
                let is_dir_item = result
                    .items
                    .get(&name)
                    .is_some_and(|item| item.kind == ItemKind::Directory);
                if !is_dir_item {
                    let item = self
                        .make_item(&name, ItemKind::Directory)
                        .with_exclude(self.exclude.clone());
                    result.items.insert(name, item);
                }
            }
        }
    }

    fn make_item(&self, name: &str, kind: ItemKind) -> SyncItem {
        SyncItem::new(
            name,
            self.category_name,
            kind,
            self.local_root.join(name),
            self.repo_root.join(name),
        )
    }
}
