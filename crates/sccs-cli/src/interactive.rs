//! Interactive conflict resolution in the terminal

use dialoguer::Input;
use sccs_core::merge::{DiffHunk, ExternalEditor, HunkChoice, HunkPrompter};
use sccs_core::{ConflictChoice, ConflictResolver, Error, Result, Side, SyncAction};

/// Maximum number of lines of a merged result shown before confirming
const PREVIEW_LINES: usize = 40;

/// Asks the user how to resolve conflicts and merge hunks
pub struct InteractiveResolver {
    editor: Option<ExternalEditor>,
}

impl Default for InteractiveResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveResolver {
    /// Create a resolver using the detected external editor
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: ExternalEditor::detect(),
        }
    }

    fn ask(prompt: &str) -> Result<String> {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt {
                reason: e.to_string(),
            })?;
        Ok(input.trim().to_lowercase())
    }

    /// Describe the conflict in user-friendly terms
    fn describe_conflict(action: &SyncAction, category: &str) -> String {
        let item = &action.item;
        let mut description = format!(
            "⚠ Conflict in {category}: {}\n  Local: {}\n  Repo:  {}\n  {}",
            item.name,
            item.path(Side::Local).display(),
            item.path(Side::Repo).display(),
            action.reason
        );
        if action.is_first_contact() {
            description.push_str("\n  (never synced before: no common base)");
        }
        description
    }

    fn print_hunk(hunk: &DiffHunk, index: usize, total: usize) {
        println!(
            "\n--- Hunk {index}/{total}: {} (repo lines {}-{}, local lines {}-{})",
            hunk.tag.describe(),
            hunk.repo_range.start + 1,
            hunk.repo_range.end,
            hunk.local_range.start + 1,
            hunk.local_range.end
        );
        for line in &hunk.repo_lines {
            print!("- {line}");
            if !line.ends_with('\n') {
                println!();
            }
        }
        for line in &hunk.local_lines {
            print!("+ {line}");
            if !line.ends_with('\n') {
                println!();
            }
        }
    }
}

impl HunkPrompter for InteractiveResolver {
    fn choose_hunk(&mut self, hunk: &DiffHunk, index: usize, total: usize) -> Result<HunkChoice> {
        Self::print_hunk(hunk, index, total);
        loop {
            let input = Self::ask("Keep [l]ocal, [r]epo, [b]oth, [e]dit or [s]kip?")?;
            match input.as_str() {
                "l" | "local" => return Ok(HunkChoice::Local),
                "r" | "repo" => return Ok(HunkChoice::Repo),
                "b" | "both" => return Ok(HunkChoice::Both),
                "e" | "edit" => return Ok(HunkChoice::Edit),
                "s" | "skip" | "" => return Ok(HunkChoice::Skip),
                _ => eprintln!("Invalid choice. Please enter l/r/b/e/s or the full word."),
            }
        }
    }

    fn edit(&mut self, content: &str, suffix: &str) -> Option<String> {
        let Some(editor) = &self.editor else {
            eprintln!("No editor found. Set $EDITOR or $VISUAL.");
            return None;
        };
        println!("Opening {}...", editor.program());
        editor.edit(content, suffix)
    }

    fn confirm_merge(&mut self, item_name: &str, merged: &str) -> Result<bool> {
        println!("\n=== Merged result for {item_name} ===");
        let lines: Vec<&str> = merged.lines().collect();
        for line in lines.iter().take(PREVIEW_LINES) {
            println!("  {line}");
        }
        if lines.len() > PREVIEW_LINES {
            println!("  ... ({} more lines)", lines.len() - PREVIEW_LINES);
        }

        let input = Self::ask("Apply merged result to both sides? [y/N]")?;
        Ok(matches!(input.as_str(), "y" | "yes"))
    }
}

impl ConflictResolver for InteractiveResolver {
    fn resolve(&mut self, action: &SyncAction, category: &str) -> Result<ConflictChoice> {
        println!("\n{}", Self::describe_conflict(action, category));

        let is_directory = action.item.kind.is_directory();
        let prompt = if is_directory {
            "Keep [l]ocal, [r]epo, show [d]iff, [s]kip or [a]bort?"
        } else {
            "Keep [l]ocal, [r]epo, [m]erge, [e]ditor, show [d]iff, [s]kip or [a]bort?"
        };

        loop {
            let input = Self::ask(prompt)?;
            let choice = match input.as_str() {
                "l" | "local" => ConflictChoice::Local,
                "r" | "repo" => ConflictChoice::Repo,
                "m" | "merge" => ConflictChoice::Merge,
                "e" | "editor" | "edit" => ConflictChoice::Editor,
                "d" | "diff" => ConflictChoice::Diff,
                "s" | "skip" | "" => ConflictChoice::Skip,
                "a" | "abort" | "q" | "quit" => ConflictChoice::Abort,
                _ => {
                    eprintln!("Invalid choice.");
                    continue;
                }
            };
            if is_directory && !choice.supports_directories() {
                eprintln!("'{choice}' is not available for directories.");
                continue;
            }
            return Ok(choice);
        }
    }

    fn show_diff(&mut self, action: &SyncAction, diff: &str) {
        println!("\nDiff for {} (repo → local):", action.item.name);
        if diff.is_empty() {
            println!("  (no textual differences)");
        } else {
            println!("{diff}");
        }
    }
}
