//! Diff generation with color-coded output

use std::fs;
use std::path::Path;

use similar::{ChangeTag, TextDiff};

use crate::error::{Error, Result};

const DIFF_CONTEXT_LINES: usize = 3;

/// Read a file as UTF-8 text
///
/// # Errors
///
/// Returns [`Error::MalformedContent`] for non-UTF-8 content, or an I/O error.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| Error::MalformedContent {
        path: path.to_path_buf(),
        reason: "content is not valid UTF-8".to_string(),
    })
}

/// Diff generator for creating visual diffs between the repository and local side
pub struct DiffGenerator;

impl Default for DiffGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffGenerator {
    /// Create a new diff generator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a color-coded unified diff from the repository file to the local file
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read as text.
    pub fn generate(local: &Path, repo: &Path) -> Result<String> {
        let local_content = read_text(local)?;
        let repo_content = read_text(repo)?;

        Ok(Self::generate_from_content(
            &local_content,
            &repo_content,
            &local.display().to_string(),
            &repo.display().to_string(),
            true,
        ))
    }

    /// Generate a plain diff between two files (no ANSI codes)
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read as text.
    pub fn generate_plain(local: &Path, repo: &Path) -> Result<String> {
        let local_content = read_text(local)?;
        let repo_content = read_text(repo)?;

        Ok(Self::generate_from_content(
            &local_content,
            &repo_content,
            &local.display().to_string(),
            &repo.display().to_string(),
            false,
        ))
    }

    /// Generate a unified diff from string contents
    ///
    /// Lines only in the repository are prefixed with `-`, lines only on the
    /// local side with `+`. Returns an empty string when contents are equal.
    #[must_use]
    pub fn generate_from_content(
        local_content: &str,
        repo_content: &str,
        local_label: &str,
        repo_label: &str,
        color: bool,
    ) -> String {
        if local_content == repo_content {
            return String::new();
        }

        let diff = TextDiff::from_lines(repo_content, local_content);
        let (bold, red, green, reset) = if color {
            ("\x1b[1m", "\x1b[31m", "\x1b[32m", "\x1b[0m")
        } else {
            ("", "", "", "")
        };

        let mut output = String::new();
        output.push_str(&format!("{bold}--- {repo_label}{reset}\n"));
        output.push_str(&format!("{bold}+++ {local_label}{reset}\n"));

        for (idx, group) in diff.grouped_ops(DIFF_CONTEXT_LINES).iter().enumerate() {
            if idx > 0 {
                output.push_str("...\n");
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let (sign, tint) = match change.tag() {
                        ChangeTag::Delete => ("-", red),
                        ChangeTag::Insert => ("+", green),
                        ChangeTag::Equal => (" ", ""),
                    };

                    let newline = if change.value().ends_with('\n') {
                        ""
                    } else {
                        "\n"
                    };

                    let end = if tint.is_empty() { "" } else { reset };
                    output.push_str(&format!("{tint}{sign}{}{newline}{end}", change.value()));
                }
            }
        }

        output
    }
}
