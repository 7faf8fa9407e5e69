//! Gitignore-style pattern matching using the ignore crate

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{Error, Result};

/// Include/exclude matcher for item discovery
///
/// Patterns follow gitignore semantics: a pattern without `/` matches the
/// basename at any depth, a pattern with `/` is anchored to the scanned root.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    include: Option<Gitignore>,
    exclude: Option<Gitignore>,
}

fn build(patterns: &[String]) -> Result<Option<Gitignore>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| Error::Pattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
    }

    let gitignore = builder.build().map_err(|e| Error::Pattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })?;
    Ok(Some(gitignore))
}

impl PatternMatcher {
    /// Matcher that includes everything and excludes nothing
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include: None,
            exclude: None,
        }
    }

    /// Build a matcher from include and exclude patterns
    ///
    /// An empty include list includes everything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if a pattern is invalid.
    pub fn with_patterns(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: build(include)?,
            exclude: build(exclude)?,
        })
    }

    /// Whether a relative path matches an include pattern
    #[must_use]
    pub fn is_included(&self, path: &Path, is_dir: bool) -> bool {
        self.include
            .as_ref()
            .is_none_or(|gi| gi.matched(path, is_dir).is_ignore())
    }

    /// Whether a relative path, or any of its parents, matches an exclude pattern
    #[must_use]
    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|gi| gi.matched_path_or_any_parents(path, is_dir).is_ignore())
    }

    /// Included and not excluded
    #[must_use]
    pub fn should_include(&self, path: &Path, is_dir: bool) -> bool {
        self.is_included(path, is_dir) && !self.is_excluded(path, is_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_no_patterns() {
        let matcher = PatternMatcher::new();
        assert!(matcher.should_include(Path::new("any/file.txt"), false));
    }

    #[test]
    fn test_exclude_pattern() {
        let matcher = PatternMatcher::with_patterns(&patterns(&["*"]), &patterns(&["*.tmp"])).unwrap();

        assert!(!matcher.should_include(Path::new("file.tmp"), false));
        assert!(matcher.should_include(Path::new("file.txt"), false));
    }

    #[test]
    fn test_basename_pattern_matches_at_depth() {
        let matcher =
            PatternMatcher::with_patterns(&patterns(&["*.md"]), &patterns(&["*secret*"])).unwrap();

        assert!(matcher.should_include(Path::new("nested/deep/agent.md"), false));
        assert!(!matcher.should_include(Path::new("nested/my-secret.md"), false));
        assert!(!matcher.should_include(Path::new("nested/notes.txt"), false));
    }

    #[test]
    fn test_excluded_parent_directory() {
        let matcher = PatternMatcher::with_patterns(&[], &patterns(&[".git", "__pycache__"])).unwrap();

        assert!(matcher.is_excluded(Path::new(".git"), true));
        assert!(matcher.is_excluded(Path::new(".git/config"), false));
        assert!(matcher.is_excluded(Path::new("pkg/__pycache__/mod.pyc"), false));
        assert!(!matcher.is_excluded(Path::new("src/main.rs"), false));
    }

    #[test]
    fn test_anchored_include() {
        let matcher = PatternMatcher::with_patterns(&patterns(&["hooks/*.sh"]), &[]).unwrap();

        assert!(matcher.is_included(Path::new("hooks/pre.sh"), false));
        assert!(!matcher.is_included(Path::new("other/pre.sh"), false));
    }
}
