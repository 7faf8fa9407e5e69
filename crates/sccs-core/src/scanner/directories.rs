//! Directory item discovery

use std::fs;
use std::path::Path;

use crate::config::PatternMatcher;

/// Names of immediate subdirectories of `root` that qualify as items
///
/// A subdirectory qualifies if it contains `marker` (when given) and its name
/// passes `matcher`.
pub(super) fn find(
    root: &Path,
    marker: Option<&str>,
    matcher: &PatternMatcher,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warnings.push(format!("Failed to read entry under {}: {e}", root.display()));
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if marker.is_some_and(|m| !path.join(m).exists()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !matcher.should_include(Path::new(&name), true) {
            continue;
        }
        names.push(name);
    }

    names.sort();
    names
}
