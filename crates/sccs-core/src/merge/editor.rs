//! External editor launching for manual merges

use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

const FALLBACK_EDITORS: [&str; 3] = ["nano", "vim", "vi"];

/// Find the full path of a binary on PATH
fn which(binary: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    let exts: &[&str] = if cfg!(windows) {
        &[".exe", ".cmd", ".bat", ""]
    } else {
        &[""]
    };

    for dir in env::split_paths(&path_var) {
        for ext in exts {
            let candidate = dir.join(format!("{binary}{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// An editor command, e.g. `code --wait`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
}

impl ExternalEditor {
    /// Parse a command line, splitting on whitespace
    #[must_use]
    pub fn from_command(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// `$EDITOR`, then `$VISUAL`, then the first of nano/vim/vi found on PATH
    #[must_use]
    pub fn detect() -> Option<Self> {
        for var in ["EDITOR", "VISUAL"] {
            if let Some(editor) = env::var(var).ok().as_deref().and_then(Self::from_command) {
                return Some(editor);
            }
        }

        FALLBACK_EDITORS
            .into_iter()
            .find(|name| which(name).is_some())
            .and_then(Self::from_command)
    }

    /// Program that will be run
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Open `content` in a scratch file with `suffix` and return the saved text
    ///
    /// Returns `None` if the editor cannot be started, exits unsuccessfully, or
    /// the scratch file cannot be read back.
    #[must_use]
    pub fn edit(&self, content: &str, suffix: &str) -> Option<String> {
        let mut scratch = match tempfile::Builder::new()
            .prefix("sccs_merge_")
            .suffix(suffix)
            .tempfile()
        {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Cannot create editor scratch file: {e}");
                return None;
            }
        };

        if let Err(e) = scratch.write_all(content.as_bytes()).and_then(|()| scratch.flush()) {
            tracing::warn!("Cannot write editor scratch file: {e}");
            return None;
        }

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(scratch.path())
            .status();

        match status {
            Ok(status) if status.success() => fs::read_to_string(scratch.path())
                .map_err(|e| tracing::warn!("Cannot read back editor scratch file: {e}"))
                .ok(),
            Ok(status) => {
                tracing::warn!("Editor '{}' exited with {status}", self.program);
                None
            }
            Err(e) => {
                tracing::warn!("Cannot start editor '{}': {e}", self.program);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_splits_arguments() {
        let editor = ExternalEditor::from_command("code --wait").unwrap();
        assert_eq!(editor.program(), "code");
        assert_eq!(editor.args, vec!["--wait".to_string()]);

        assert!(ExternalEditor::from_command("   ").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_returns_saved_content() {
        // `true` leaves the file untouched and exits successfully
        let editor = ExternalEditor::from_command("true").unwrap();
        assert_eq!(editor.edit("keep me\n", ".md").as_deref(), Some("keep me\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_editor_is_none() {
        let editor = ExternalEditor::from_command("false").unwrap();
        assert!(editor.edit("x", ".md").is_none());

        let missing = ExternalEditor::from_command("sccs-no-such-editor-binary").unwrap();
        assert!(missing.edit("x", ".md").is_none());
    }
}
