//! Conflict resolution
//!
//! A conflict is settled by asking a [`ConflictResolver`] until it picks a
//! terminal choice. `Diff`, a rejected merge and a failed edit go back to the
//! menu; after [`MAX_PROMPTS`] such rounds the conflict is left unresolved.

use std::fmt;

use super::actions::SyncAction;
use super::item::Side;
use crate::comparison::{read_text, DiffGenerator, DirectoryComparator};
use crate::error::Result;
use crate::merge::{interactive_merge, DiffHunk, HunkChoice, HunkPrompter};

/// Maximum number of non-terminal prompts for one conflict
pub const MAX_PROMPTS: usize = 16;

/// Answer to a conflict prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Keep the local version
    Local,
    /// Keep the repository version
    Repo,
    /// Merge hunk by hunk
    Merge,
    /// Edit the local version in an external editor
    Editor,
    /// Show the diff and ask again
    Diff,
    /// Leave the item alone
    Skip,
    /// Stop the whole sync
    Abort,
}

impl ConflictChoice {
    /// Whether this choice is offered for directory items
    #[must_use]
    pub const fn supports_directories(self) -> bool {
        !matches!(self, Self::Merge | Self::Editor)
    }
}

impl fmt::Display for ConflictChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Repo => "repo",
            Self::Merge => "merge",
            Self::Editor => "editor",
            Self::Diff => "diff",
            Self::Skip => "skip",
            Self::Abort => "abort",
        };
        f.write_str(name)
    }
}

/// Decides conflicts on behalf of the user
///
/// The [`HunkPrompter`] supertrait supplies per-hunk answers when `Merge` is
/// chosen and the editor used for `Editor`.
pub trait ConflictResolver: HunkPrompter {
    /// Choose how to resolve a conflicting action in `category`
    ///
    /// # Errors
    ///
    /// Returns an error if the choice cannot be obtained.
    fn resolve(&mut self, action: &SyncAction, category: &str) -> Result<ConflictChoice>;

    /// Present a rendered diff of the conflicting item
    fn show_diff(&mut self, _action: &SyncAction, _diff: &str) {}
}

/// Adapts a closure into a [`ConflictResolver`]
///
/// Hunks are answered with [`HunkChoice::Skip`], merges are accepted and
/// editing is unavailable.
pub struct CallbackResolver<F> {
    callback: F,
}

impl<F> CallbackResolver<F>
where
    F: FnMut(&SyncAction, &str) -> ConflictChoice,
{
    /// Wrap `callback`
    pub const fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> HunkPrompter for CallbackResolver<F>
where
    F: FnMut(&SyncAction, &str) -> ConflictChoice,
{
    fn choose_hunk(&mut self, _hunk: &DiffHunk, _index: usize, _total: usize) -> Result<HunkChoice> {
        Ok(HunkChoice::Skip)
    }

    fn confirm_merge(&mut self, _item_name: &str, _merged: &str) -> Result<bool> {
        Ok(true)
    }
}

impl<F> ConflictResolver for CallbackResolver<F>
where
    F: FnMut(&SyncAction, &str) -> ConflictChoice,
{
    fn resolve(&mut self, action: &SyncAction, category: &str) -> Result<ConflictChoice> {
        Ok((self.callback)(action, category))
    }
}

/// How a conflict ended
#[derive(Debug, Clone)]
pub(crate) enum Disposition {
    /// Execute this copy action
    Apply(SyncAction),
    /// Write this content to both sides
    Merged { content: String },
    /// User chose to skip
    Skipped,
    /// No terminal choice within [`MAX_PROMPTS`] rounds
    Unresolved,
    /// User aborted the sync
    Aborted,
}

/// Ask `resolver` until the conflict reaches a terminal state
///
/// # Errors
///
/// Returns an error if the resolver fails or a side cannot be read as text
/// for a merge.
pub(crate) fn resolve_conflict(
    action: &SyncAction,
    category: &str,
    resolver: &mut dyn ConflictResolver,
) -> Result<Disposition> {
    let item = &action.item;
    let is_directory = item.kind.is_directory();

    for _ in 0..MAX_PROMPTS {
        let choice = resolver.resolve(action, category)?;
        if is_directory && !choice.supports_directories() {
            tracing::warn!("'{choice}' is not available for directory item {}", item.name);
            continue;
        }

        match choice {
            ConflictChoice::Local | ConflictChoice::Repo => {
                let side = if choice == ConflictChoice::Local {
                    Side::Local
                } else {
                    Side::Repo
                };
                return Ok(Disposition::Apply(
                    action.resolved_toward(side, format!("Conflict resolved: keep {side}")),
                ));
            }
            ConflictChoice::Skip => return Ok(Disposition::Skipped),
            ConflictChoice::Abort => return Ok(Disposition::Aborted),
            ConflictChoice::Diff => match render_diff(action) {
                Ok(diff) => resolver.show_diff(action, &diff),
                Err(e) => {
                    tracing::warn!("Cannot diff {}: {e}", item.name);
                    resolver.show_diff(action, &format!("(diff unavailable: {e})"));
                }
            },
            ConflictChoice::Merge => {
                let local = read_text(item.path(Side::Local))?;
                let repo = read_text(item.path(Side::Repo))?;
                let result = interactive_merge(&local, &repo, &item.suffix(), resolver)?;
                tracing::debug!(
                    "Merged {}: {} hunks, {} local, {} repo, {} both, {} edited",
                    item.name,
                    result.stats.total,
                    result.stats.local,
                    result.stats.repo,
                    result.stats.both,
                    result.stats.edited
                );
                if resolver.confirm_merge(&item.name, &result.merged)? {
                    return Ok(Disposition::Merged {
                        content: result.merged,
                    });
                }
            }
            ConflictChoice::Editor => {
                let local = read_text(item.path(Side::Local))?;
                match resolver.edit(&local, &item.suffix()) {
                    Some(edited) => {
                        if resolver.confirm_merge(&item.name, &edited)? {
                            return Ok(Disposition::Merged { content: edited });
                        }
                    }
                    None => tracing::warn!("Editing {} failed", item.name),
                }
            }
        }
    }

    tracing::warn!(
        "Conflict for {category}:{} unresolved after {MAX_PROMPTS} prompts",
        item.name
    );
    Ok(Disposition::Unresolved)
}

fn render_diff(action: &SyncAction) -> Result<String> {
    let item = &action.item;
    let local = item.path(Side::Local);
    let repo = item.path(Side::Repo);
    if item.kind.is_directory() {
        Ok(DirectoryComparator::compare(local, repo)?.summary())
    } else {
        DiffGenerator::generate(local, repo)
    }
}
