//! Hunk-by-hunk merging of two text versions
//!
//! The repository and local versions are split into aligned hunks. Equal
//! hunks are copied through; for every differing hunk a [`HunkPrompter`]
//! decides which lines end up in the merged text.

mod editor;
mod hunks;

pub use editor::ExternalEditor;
pub use hunks::{split_into_hunks, DiffHunk, HunkTag};

use crate::error::Result;

/// Resolution of one differing hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkChoice {
    /// Keep the local lines
    Local,
    /// Keep the repository lines
    Repo,
    /// Keep repository lines followed by local lines
    Both,
    /// Edit the local lines in an editor
    Edit,
    /// Keep the repository lines
    Skip,
}

/// Source of per-hunk decisions during a merge
pub trait HunkPrompter {
    /// Choose how to resolve hunk `index` (1-based) of `total` differing hunks
    ///
    /// # Errors
    ///
    /// Returns an error if the choice cannot be obtained.
    fn choose_hunk(&mut self, hunk: &DiffHunk, index: usize, total: usize) -> Result<HunkChoice>;

    /// Let the user edit `content`; `None` means the edit failed
    fn edit(&mut self, _content: &str, _suffix: &str) -> Option<String> {
        None
    }

    /// Show the merged result and ask whether to apply it
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be obtained.
    fn confirm_merge(&mut self, item_name: &str, merged: &str) -> Result<bool>;
}

/// How differing hunks were resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Differing hunks
    pub total: usize,
    /// Resolved with local lines (including failed edits)
    pub local: usize,
    /// Resolved with repository lines (including skips)
    pub repo: usize,
    /// Resolved with both
    pub both: usize,
    /// Resolved by editing
    pub edited: usize,
}

/// Merged text and statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    /// Merged content
    pub merged: String,
    /// Resolution statistics
    pub stats: MergeStats,
}

/// Merge `local` and `repo` hunk by hunk
///
/// `suffix` is passed to the editor for `Edit` choices. If the versions are
/// identical the local content is returned without prompting.
///
/// # Errors
///
/// Returns an error if the prompter fails.
pub fn interactive_merge<P: HunkPrompter + ?Sized>(
    local: &str,
    repo: &str,
    suffix: &str,
    prompter: &mut P,
) -> Result<MergeResult> {
    let hunks = split_into_hunks(local, repo);
    let total = hunks.iter().filter(|h| h.is_change()).count();
    let mut result = MergeResult {
        stats: MergeStats {
            total,
            ..MergeStats::default()
        },
        ..MergeResult::default()
    };

    if total == 0 {
        result.merged = local.to_string();
        return Ok(result);
    }

    let mut index = 0;
    for hunk in &hunks {
        if !hunk.is_change() {
            result.merged.extend(hunk.local_lines.iter().map(String::as_str));
            continue;
        }

        index += 1;
        let stats = &mut result.stats;
        let lines: Vec<&str> = match prompter.choose_hunk(hunk, index, total)? {
            HunkChoice::Local => {
                stats.local += 1;
                hunk.local_lines.iter().map(String::as_str).collect()
            }
            HunkChoice::Repo | HunkChoice::Skip => {
                stats.repo += 1;
                hunk.repo_lines.iter().map(String::as_str).collect()
            }
            HunkChoice::Both => {
                stats.both += 1;
                hunk.repo_lines
                    .iter()
                    .chain(&hunk.local_lines)
                    .map(String::as_str)
                    .collect()
            }
            HunkChoice::Edit => {
                let seed = hunk.local_lines.concat();
                if let Some(edited) = prompter.edit(&seed, suffix) {
                    stats.edited += 1;
                    result.merged.push_str(&edited);
                    continue;
                }
                tracing::warn!("Edit failed for hunk {index}/{total}, keeping local lines");
                stats.local += 1;
                hunk.local_lines.iter().map(String::as_str).collect()
            }
        };
        result.merged.extend(lines);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Scripted {
        choices: Vec<HunkChoice>,
        edit: Option<String>,
        seen: Vec<(usize, usize)>,
    }

    impl Scripted {
        fn new(choices: Vec<HunkChoice>) -> Self {
            Self {
                choices,
                edit: None,
                seen: Vec::new(),
            }
        }
    }

    impl HunkPrompter for Scripted {
        fn choose_hunk(&mut self, _hunk: &DiffHunk, index: usize, total: usize) -> Result<HunkChoice> {
            self.seen.push((index, total));
            Ok(self.choices[(index - 1).min(self.choices.len() - 1)])
        }

        fn edit(&mut self, _content: &str, _suffix: &str) -> Option<String> {
            self.edit.clone()
        }

        fn confirm_merge(&mut self, _item_name: &str, _merged: &str) -> Result<bool> {
            Ok(true)
        }
    }

    const REPO: &str = "title\nrepo line\nshared\nrepo tail\n";
    const LOCAL: &str = "title\nlocal line\nshared\nlocal tail\n";

    #[test]
    fn test_all_local_reproduces_local() {
        let mut prompter = Scripted::new(vec![HunkChoice::Local]);
        let result = interactive_merge(LOCAL, REPO, ".md", &mut prompter).unwrap();

        assert_eq!(result.merged, LOCAL);
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.local, 2);
        assert_eq!(prompter.seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_all_repo_reproduces_repo() {
        let mut prompter = Scripted::new(vec![HunkChoice::Repo, HunkChoice::Skip]);
        let result = interactive_merge(LOCAL, REPO, ".md", &mut prompter).unwrap();

        assert_eq!(result.merged, REPO);
        assert_eq!(result.stats.repo, 2);
    }

    #[test]
    fn test_both_puts_repo_first() {
        let mut prompter = Scripted::new(vec![HunkChoice::Both, HunkChoice::Local]);
        let result = interactive_merge(LOCAL, REPO, ".md", &mut prompter).unwrap();

        assert_eq!(
            result.merged,
            "title\nrepo line\nlocal line\nshared\nlocal tail\n"
        );
        assert_eq!(result.stats.both, 1);
    }

    #[test]
    fn test_edit_and_failed_edit() {
        let mut prompter = Scripted::new(vec![HunkChoice::Edit, HunkChoice::Repo]);
        prompter.edit = Some("edited line\n".to_string());
        let result = interactive_merge(LOCAL, REPO, ".md", &mut prompter).unwrap();
        assert_eq!(result.merged, "title\nedited line\nshared\nrepo tail\n");
        assert_eq!(result.stats.edited, 1);

        let mut failing = Scripted::new(vec![HunkChoice::Edit]);
        let result = interactive_merge(LOCAL, REPO, ".md", &mut failing).unwrap();
        assert_eq!(result.merged, LOCAL);
        assert_eq!(result.stats.local, 2);
    }

    #[test]
    fn test_identical_needs_no_prompt() {
        let mut prompter = Scripted::new(vec![HunkChoice::Repo]);
        let result = interactive_merge(LOCAL, LOCAL, ".md", &mut prompter).unwrap();

        assert_eq!(result.merged, LOCAL);
        assert!(prompter.seen.is_empty());
    }
}
