//! File item discovery

use std::path::Path;

use walkdir::WalkDir;

use crate::config::PatternMatcher;

/// Filter applied while walking a category root for file items
pub(super) struct FileFilter<'a> {
    pub matcher: &'a PatternMatcher,
    pub item_pattern: Option<&'a PatternMatcher>,
    pub recursive: bool,
}

fn join_relative(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl FileFilter<'_> {
    /// Relative names (`/`-separated) of matching files under `root`
    ///
    /// Excluded directories are not descended into. Unreadable entries are
    /// reported in `warnings`.
    pub fn find(&self, root: &Path, warnings: &mut Vec<String>) -> Vec<String> {
        if !root.is_dir() {
            return Vec::new();
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                entry
                    .path()
                    .strip_prefix(root)
                    .map_or(true, |rel| !self.matcher.is_excluded(rel, true))
            });

        let mut names = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warnings.push(format!("Failed to read entry under {}: {e}", root.display()));
                    continue;
                }
            };

            if !entry.path().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };

            if let Some(pattern) = self.item_pattern {
                let basename = Path::new(entry.file_name());
                if !pattern.is_included(basename, false) {
                    continue;
                }
            }
            if !self.matcher.should_include(rel, false) {
                continue;
            }

            names.push(join_relative(rel));
        }

        names.sort();
        names
    }
}
