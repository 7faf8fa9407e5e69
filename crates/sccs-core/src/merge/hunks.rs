//! Splitting two versions of a text into aligned hunks

use std::ops::Range;

use similar::{Algorithm, DiffTag, TextDiff};

/// Kind of a hunk, read from the repository version towards the local one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkTag {
    /// Identical on both sides
    Equal,
    /// Lines only on the local side
    Insert,
    /// Lines only on the repository side
    Delete,
    /// Lines differ between sides
    Replace,
}

impl HunkTag {
    /// Short description for prompts
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Equal => "unchanged",
            Self::Insert => "added in local",
            Self::Delete => "removed in local",
            Self::Replace => "modified",
        }
    }
}

/// A contiguous aligned span of the repository and local versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Kind of change
    pub tag: HunkTag,
    /// Repository lines, with line endings
    pub repo_lines: Vec<String>,
    /// Local lines, with line endings
    pub local_lines: Vec<String>,
    /// Line range in the repository version
    pub repo_range: Range<usize>,
    /// Line range in the local version
    pub local_range: Range<usize>,
}

impl DiffHunk {
    /// Whether the hunk holds a difference
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.tag != HunkTag::Equal
    }
}

/// Split local and repository content into hunks, equal spans included
///
/// Uses an LCS line diff with the repository version as the old side.
#[must_use]
pub fn split_into_hunks(local: &str, repo: &str) -> Vec<DiffHunk> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_lines(repo, local);
    let repo_lines = diff.old_slices();
    let local_lines = diff.new_slices();

    let collect = |lines: &[&str], range: &Range<usize>| -> Vec<String> {
        lines[range.clone()].iter().map(|l| (*l).to_string()).collect()
    };

    diff.ops()
        .iter()
        .map(|op| {
            let (tag, repo_range, local_range) = op.as_tag_tuple();
            let tag = match tag {
                DiffTag::Equal => HunkTag::Equal,
                DiffTag::Insert => HunkTag::Insert,
                DiffTag::Delete => HunkTag::Delete,
                DiffTag::Replace => HunkTag::Replace,
            };
            DiffHunk {
                tag,
                repo_lines: collect(repo_lines, &repo_range),
                local_lines: collect(local_lines, &local_range),
                repo_range,
                local_range,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(hunks: &[DiffHunk], pick_local: bool) -> String {
        hunks
            .iter()
            .flat_map(|h| if pick_local { &h.local_lines } else { &h.repo_lines })
            .cloned()
            .collect()
    }

    #[test]
    fn test_identical_is_single_equal_hunk() {
        let hunks = split_into_hunks("a\nb\n", "a\nb\n");
        assert_eq!(hunks.len(), 1);
        assert!(!hunks[0].is_change());
    }

    #[test]
    fn test_hunks_reassemble_both_sides() {
        let local = "one\ntwo changed\nthree\nfour\nextra";
        let repo = "zero\none\ntwo\nthree\nfour\n";
        let hunks = split_into_hunks(local, repo);

        assert_eq!(join(&hunks, true), local);
        assert_eq!(join(&hunks, false), repo);
        assert!(hunks.iter().any(DiffHunk::is_change));
    }

    #[test]
    fn test_ranges_align_with_lines() {
        let hunks = split_into_hunks("a\nX\nc\n", "a\nb\nc\n");
        let change = hunks.iter().find(|h| h.is_change()).unwrap();

        assert_eq!(change.repo_range, 1..2);
        assert_eq!(change.local_range, 1..2);
        assert_eq!(change.repo_lines, vec!["b\n".to_string()]);
        assert_eq!(change.local_lines, vec!["X\n".to_string()]);
    }

    #[test]
    fn test_pure_insertion() {
        let hunks = split_into_hunks("a\nnew\n", "a\n");
        let change = hunks.iter().find(|h| h.is_change()).unwrap();
        assert_eq!(change.tag, HunkTag::Insert);
        assert!(change.repo_lines.is_empty());
    }
}
