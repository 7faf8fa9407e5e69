//! Atomic file operations executor

use std::fs;
use std::path::{Path, PathBuf};

use super::actions::{ActionType, SyncAction};
use super::backup::BackupStore;
use super::item::{Side, SyncItem};
use crate::atomic;
use crate::error::{Error, ErrorKind, Result};

/// Outcome of executing one action
#[derive(Debug, Clone)]
pub struct ActionResult {
    /// Item the action applied to
    pub item_name: String,
    /// Action that was executed
    pub action_type: ActionType,
    /// Whether it succeeded
    pub success: bool,
    /// Failure description
    pub error: Option<String>,
    /// Failure classification
    pub error_kind: Option<ErrorKind>,
    /// Backup taken before overwriting or deleting
    pub backup: Option<PathBuf>,
}

impl ActionResult {
    pub(crate) fn ok(action: &SyncAction, backup: Option<PathBuf>) -> Self {
        Self {
            item_name: action.item.name.clone(),
            action_type: action.action_type,
            success: true,
            error: None,
            error_kind: None,
            backup,
        }
    }

    pub(crate) fn failed(action: &SyncAction, error: &Error) -> Self {
        Self::failure(action, error.to_string(), Some(error.kind()))
    }

    pub(crate) fn failure(action: &SyncAction, message: String, kind: Option<ErrorKind>) -> Self {
        Self {
            item_name: action.item.name.clone(),
            action_type: action.action_type,
            success: false,
            error: Some(message),
            error_kind: kind,
            backup: None,
        }
    }
}

/// Executes sync actions with backups and atomic replacement
pub struct ActionExecutor {
    backups: BackupStore,
    dry_run: bool,
}

impl ActionExecutor {
    /// Create a new executor
    #[must_use]
    pub const fn new(backups: BackupStore, dry_run: bool) -> Self {
        Self { backups, dry_run }
    }

    /// Whether filesystem changes are suppressed
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Execute an action, capturing any failure in the result
    #[must_use]
    pub fn execute(&self, action: &SyncAction) -> ActionResult {
        if !action.action_type.needs_action() {
            return ActionResult::ok(action, None);
        }

        if action.action_type == ActionType::Conflict {
            let error = Error::UnresolvedConflict {
                name: action.item.name.clone(),
            };
            return ActionResult::failed(action, &error);
        }

        if self.dry_run {
            tracing::info!(
                "[DRY RUN] Would {} {} ({})",
                action.action_type,
                action.item.name,
                action.action_type.direction()
            );
            return ActionResult::ok(action, None);
        }

        let outcome = if let Some(from) = action.action_type.source_side() {
            self.copy(&action.item, from)
        } else if let Some(target) = action.action_type.delete_target() {
            self.delete(&action.item, target)
        } else {
            Ok(None)
        };

        match outcome {
            Ok(backup) => {
                tracing::debug!("{} {}: done", action.action_type, action.item.name);
                ActionResult::ok(action, backup)
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {e}", action.action_type, action.item.name);
                ActionResult::failed(action, &e)
            }
        }
    }

    fn copy(&self, item: &SyncItem, from: Side) -> Result<Option<PathBuf>> {
        let source = item.path(from);
        let dest = item.path(from.other());

        if !source.exists() {
            return Err(Error::NotFound {
                path: source.to_path_buf(),
            });
        }

        // Excluded entries of `dest` stay in place, so the backup skips them.
        let backup = self
            .backups
            .create_backup_excluding(dest, &item.category, item.exclude())?;
        atomic::copy_atomic(source, dest, item.exclude())?;
        Ok(backup)
    }

    fn delete(&self, item: &SyncItem, target: Side) -> Result<Option<PathBuf>> {
        let path = item.path(target);
        if !path.exists() {
            return Ok(None);
        }

        let backup = self.backups.create_backup(path, &item.category)?;
        remove_path(path)?;
        Ok(backup)
    }

    /// Back up both sides and write identical merged content to each
    ///
    /// Returns the backups taken. Does nothing in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns an error for directory items or if a write fails.
    pub fn write_merged(&self, item: &SyncItem, content: &str) -> Result<Vec<PathBuf>> {
        if item.kind.is_directory() {
            return Err(Error::MalformedContent {
                path: item.path(Side::Local).to_path_buf(),
                reason: "directory items cannot be merged".to_string(),
            });
        }
        if self.dry_run {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for side in [Side::Local, Side::Repo] {
            let path = item.path(side);
            if let Some(backup) = self.backups.create_backup(path, &item.category)? {
                backups.push(backup);
            }
            atomic::write_atomic(path, content.as_bytes())?;
        }
        Ok(backups)
    }
}

fn remove_path(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}
