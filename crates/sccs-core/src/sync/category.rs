//! Synchronization of one category

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::actions::{determine_action, ActionType, SyncAction};
use super::backup::BackupStore;
use super::conflict::{resolve_conflict, ConflictResolver, Disposition};
use super::executor::{ActionExecutor, ActionResult};
use super::item::{Side, SyncItem};
use super::state::{ItemUpdate, StateManager};
use crate::comparison::content_hash;
use crate::config::CategoryConfig;
use crate::error::Result;
use crate::scanner::{ScanResult, Scanner};
use crate::settings::{ensure_settings, SettingsEnsureResult};

/// Options for a sync run
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Report what would happen without changing files or the ledger
    pub dry_run: bool,
    /// Resolve every conflict by copying from this side
    pub force_direction: Option<Side>,
}

/// Pending changes of a category
#[derive(Debug, Clone, Default)]
pub struct CategoryStatus {
    /// Category name
    pub name: String,
    /// Whether the category is enabled
    pub enabled: bool,
    /// Restricting platforms, if any
    pub platforms: Option<Vec<String>>,
    /// Number of discovered items
    pub total_items: usize,
    /// Actions per type
    pub counts: BTreeMap<ActionType, usize>,
    /// Items identical on both sides
    pub unchanged: usize,
    /// Items with a pending copy or delete
    pub to_sync: usize,
    /// Items changed on both sides
    pub conflicts: usize,
    /// Items that could not be inspected
    pub errors: usize,
    /// Pending actions on items the ledger has never seen
    pub first_contact: usize,
    /// Actions, sorted by item name
    pub actions: Vec<SyncAction>,
    /// Non-fatal scan warnings
    pub warnings: Vec<String>,
    /// Discovery failure, if the category could not be scanned
    pub error: Option<String>,
}

impl CategoryStatus {
    /// Number of actions of `action_type`
    #[must_use]
    pub fn count(&self, action_type: ActionType) -> usize {
        self.counts.get(&action_type).copied().unwrap_or(0)
    }

    /// Whether anything would be synced or needs resolution
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.to_sync > 0 || self.conflicts > 0
    }

    /// Whether there are conflicts or errors
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        self.conflicts > 0 || self.errors > 0 || self.error.is_some()
    }
}

/// Outcome of syncing one category
#[derive(Debug, Clone, Default)]
pub struct CategorySyncResult {
    /// Category name
    pub name: String,
    /// Number of actions considered
    pub total: usize,
    /// Actions executed successfully (merges included)
    pub synced: usize,
    /// Items skipped by mode, by choice or left unresolved
    pub skipped: usize,
    /// Conflicts left for a later run
    pub conflicts: usize,
    /// Failed items
    pub errors: usize,
    /// Whether the user aborted
    pub aborted: bool,
    /// Per-item results
    pub results: Vec<ActionResult>,
    /// Settings ensure outcome, if configured
    pub settings_result: Option<SettingsEnsureResult>,
}

impl CategorySyncResult {
    /// Whether the category finished without errors
    #[must_use]
    pub const fn success(&self) -> bool {
        self.errors == 0 && !self.aborted
    }
}

/// Discovers, classifies and synchronizes the items of one category
///
/// Scan results and actions are cached until [`CategoryHandler::reset_cache`]
/// is called; [`CategoryHandler::sync`] resets the cache when it finishes.
pub struct CategoryHandler {
    name: String,
    category: CategoryConfig,
    repo_base: PathBuf,
    global_exclude: Vec<String>,
    backups: BackupStore,
    items: Option<ScanResult>,
    actions: Option<Vec<SyncAction>>,
}

impl CategoryHandler {
    /// Create a handler
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: CategoryConfig,
        repo_base: impl Into<PathBuf>,
        global_exclude: Vec<String>,
        backups: BackupStore,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            repo_base: repo_base.into(),
            global_exclude,
            backups,
            items: None,
            actions: None,
        }
    }

    /// Category name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category configuration
    #[must_use]
    pub const fn config(&self) -> &CategoryConfig {
        &self.category
    }

    /// Local root of the category
    #[must_use]
    pub fn local_root(&self) -> &Path {
        &self.category.local_path
    }

    /// Repository root of the category
    #[must_use]
    pub fn repo_root(&self) -> PathBuf {
        self.repo_base.join(&self.category.repo_path)
    }

    /// Drop cached scan results and actions
    pub fn reset_cache(&mut self) {
        self.items = None;
        self.actions = None;
    }

    /// Discover items on both sides (cached)
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns or an unreadable category root.
    pub fn scan_items(&mut self) -> Result<&ScanResult> {
        let items = match self.items.take() {
            Some(items) => items,
            None => Scanner::new(
                &self.name,
                &self.category,
                &self.repo_base,
                &self.global_exclude,
            )?
            .scan()?,
        };
        Ok(self.items.insert(items))
    }

    /// Classify every item against the ledger (cached)
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    pub fn detect_changes(&mut self, ledger: &StateManager) -> Result<&[SyncAction]> {
        let actions = match self.actions.take() {
            Some(actions) => actions,
            None => {
                let name = self.name.clone();
                let mode = self.category.sync_mode;
                self.scan_items()?
                    .items
                    .values()
                    .map(|item| {
                        determine_action(item.clone(), ledger.item_hash(&name, &item.name), mode)
                    })
                    .collect()
            }
        };
        Ok(self.actions.insert(actions))
    }

    /// Summarize pending changes
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    pub fn get_status(&mut self, ledger: &StateManager) -> Result<CategoryStatus> {
        let actions = self.detect_changes(ledger)?.to_vec();
        let warnings = self
            .items
            .as_ref()
            .map(|scan| scan.warnings.clone())
            .unwrap_or_default();

        let mut status = CategoryStatus {
            name: self.name.clone(),
            enabled: self.category.enabled,
            platforms: self.category.platforms.clone(),
            total_items: actions.len(),
            warnings,
            ..CategoryStatus::default()
        };

        for action in &actions {
            *status.counts.entry(action.action_type).or_default() += 1;
            if action.error.is_some() {
                status.errors += 1;
                continue;
            }
            match action.action_type {
                ActionType::Unchanged => status.unchanged += 1,
                ActionType::Conflict => status.conflicts += 1,
                ActionType::Skip => {}
                _ => status.to_sync += 1,
            }
            if action.action_type.needs_action() && action.is_first_contact() {
                status.first_contact += 1;
            }
        }

        status.actions = actions;
        Ok(status)
    }

    /// Synchronize the category
    ///
    /// Conflicts are resolved with `options.force_direction` if set, otherwise
    /// with `resolver`; without either (or in a dry run) they are left pending.
    /// Per-item failures are recorded in the result.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the ledger cannot be written.
    pub fn sync(
        &mut self,
        ledger: &mut StateManager,
        options: &SyncOptions,
        mut resolver: Option<&mut dyn ConflictResolver>,
    ) -> Result<CategorySyncResult> {
        let actions = self.detect_changes(ledger)?.to_vec();
        let executor = ActionExecutor::new(self.backups.clone(), options.dry_run);
        let mut result = CategorySyncResult {
            name: self.name.clone(),
            total: actions.len(),
            ..CategorySyncResult::default()
        };

        tracing::info!(
            "Syncing category '{}' ({} items{})",
            self.name,
            actions.len(),
            if options.dry_run { ", dry run" } else { "" }
        );

        for action in actions {
            if let Some(error) = &action.error {
                result.errors += 1;
                result
                    .results
                    .push(ActionResult::failure(&action, error.clone(), None));
                continue;
            }

            let action = if action.action_type == ActionType::Conflict {
                if let Some(side) = options.force_direction {
                    action.resolved_toward(side, format!("Conflict resolved: force {side}"))
                } else if let (Some(resolver), false) = (resolver.as_deref_mut(), options.dry_run) {
                    match resolve_conflict(&action, &self.name, resolver) {
                        Ok(Disposition::Apply(resolved)) => resolved,
                        Ok(Disposition::Merged { content }) => {
                            self.apply_merge(&executor, ledger, &action, &content, &mut result)?;
                            continue;
                        }
                        Ok(Disposition::Skipped | Disposition::Unresolved) => {
                            result.skipped += 1;
                            continue;
                        }
                        Ok(Disposition::Aborted) => {
                            tracing::info!("Sync aborted during category '{}'", self.name);
                            result.aborted = true;
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Cannot resolve conflict for {}: {e}", action.item.name);
                            result.errors += 1;
                            result.results.push(ActionResult::failed(&action, &e));
                            continue;
                        }
                    }
                } else {
                    result.conflicts += 1;
                    continue;
                }
            } else {
                action
            };

            match action.action_type {
                ActionType::Unchanged => {
                    if !options.dry_run {
                        Self::record_baseline(ledger, &action)?;
                    }
                    continue;
                }
                ActionType::Skip => {
                    result.skipped += 1;
                    continue;
                }
                _ => {}
            }

            let action_result = executor.execute(&action);
            if action_result.success {
                result.synced += 1;
                if !options.dry_run {
                    Self::record(ledger, &action)?;
                }
            } else {
                result.errors += 1;
            }
            result.results.push(action_result);
        }

        if !options.dry_run && !result.aborted {
            self.prune_vanished(ledger)?;
        }

        if !result.aborted {
            if let Some(settings) = &self.category.settings_ensure {
                result.settings_result = Some(ensure_settings(
                    settings,
                    options.dry_run,
                    &self.name,
                    &self.backups,
                ));
            }
        }

        self.reset_cache();
        Ok(result)
    }

    fn apply_merge(
        &self,
        executor: &ActionExecutor,
        ledger: &mut StateManager,
        action: &SyncAction,
        content: &str,
        result: &mut CategorySyncResult,
    ) -> Result<()> {
        let item = &action.item;
        match executor.write_merged(item, content) {
            Ok(backups) => {
                tracing::debug!("Merged {} written to both sides", item.name);
                result.synced += 1;
                result
                    .results
                    .push(ActionResult::ok(action, backups.into_iter().next()));
                if !executor.is_dry_run() {
                    ledger.update_item(
                        &self.name,
                        &item.name,
                        ItemUpdate {
                            content_hash: Some(content_hash(content.as_bytes())),
                            local_mtime: item.mtime(Side::Local),
                            repo_mtime: item.mtime(Side::Repo),
                            action: "merged".to_string(),
                        },
                    )?;
                }
            }
            Err(e) => {
                tracing::warn!("Writing merge of {} failed: {e}", item.name);
                result.errors += 1;
                result.results.push(ActionResult::failed(action, &e));
            }
        }
        Ok(())
    }

    /// Forget ledger entries of items gone from both sides
    ///
    /// A stale entry would make a later item of the same name look deleted on
    /// the side it is missing from.
    fn prune_vanished(&self, ledger: &mut StateManager) -> Result<()> {
        let Some(scan) = &self.items else {
            return Ok(());
        };
        let removed = ledger.prune_category(&self.name, |name| {
            scan.items.get(name).is_some_and(SyncItem::exists_either)
        })?;
        if removed > 0 {
            tracing::info!(
                "Forgot {removed} item(s) of '{}' missing on both sides",
                self.name
            );
        }
        Ok(())
    }

    /// Record the agreed hash of an unchanged item unless the ledger has it
    fn record_baseline(ledger: &mut StateManager, action: &SyncAction) -> Result<()> {
        let item = &action.item;
        let hash = match item.hash(Side::Local) {
            Ok(Some(hash)) => hash,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!("Cannot hash {}: {e}", item.name);
                return Ok(());
            }
        };
        if ledger.item_hash(&item.category, &item.name) == Some(&hash) {
            return Ok(());
        }

        ledger.update_item(
            &item.category,
            &item.name,
            ItemUpdate {
                content_hash: Some(hash),
                local_mtime: item.mtime(Side::Local),
                repo_mtime: item.mtime(Side::Repo),
                action: ActionType::Unchanged.as_str().to_string(),
            },
        )
    }

    fn record(ledger: &mut StateManager, action: &SyncAction) -> Result<()> {
        let item = &action.item;
        if action.action_type.is_delete() {
            ledger.remove_item(&item.category, &item.name)?;
            return Ok(());
        }

        let content_hash = item.hash(Side::Local).unwrap_or_else(|e| {
            tracing::warn!("Cannot hash {} after sync: {e}", item.name);
            None
        });
        ledger.update_item(
            &item.category,
            &item.name,
            ItemUpdate {
                content_hash,
                local_mtime: item.mtime(Side::Local),
                repo_mtime: item.mtime(Side::Repo),
                action: action.action_type.as_str().to_string(),
            },
        )
    }
}
