//! Sync orchestration across categories

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use super::backup::BackupStore;
use super::category::{CategoryHandler, CategoryStatus, CategorySyncResult, SyncOptions};
use super::conflict::ConflictResolver;
use super::state::StateManager;
use crate::config::{is_platform_match, CategoryConfig, Config};
use crate::error::{Error, Result};
use crate::scanner::Scanner;

/// Predicate selecting which categories take part in a run
pub type CategoryFilter = Box<dyn Fn(&str, &CategoryConfig) -> bool>;

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Everything completed without errors
    Success,
    /// Some items or categories failed or were left in conflict
    Partial,
    /// The user aborted
    Aborted,
}

/// Aggregated result of a run
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// Categories selected for the run
    pub total_categories: usize,
    /// Categories that finished without errors
    pub synced_categories: usize,
    /// Items considered
    pub total_items: usize,
    /// Items synced
    pub synced_items: usize,
    /// Items skipped
    pub skipped_items: usize,
    /// Conflicts left pending
    pub conflicts: usize,
    /// Failed items
    pub errors: usize,
    /// Categories whose settings file was changed
    pub settings_ensured: usize,
    /// Whether the user aborted
    pub aborted: bool,
    /// Per-category results
    pub category_results: BTreeMap<String, CategorySyncResult>,
    /// Categories that failed as a whole, with the reason
    pub category_errors: BTreeMap<String, String>,
}

impl SyncResult {
    /// Whether any item or category failed
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0 || !self.category_errors.is_empty()
    }

    /// Whether there are errors or pending conflicts
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.has_errors() || self.conflicts > 0
    }

    /// Classify the run
    #[must_use]
    pub fn outcome(&self) -> SyncOutcome {
        if self.aborted {
            SyncOutcome::Aborted
        } else if self.has_issues() {
            SyncOutcome::Partial
        } else {
            SyncOutcome::Success
        }
    }
}

/// Synchronizes the configured categories against one ledger
pub struct SyncEngine {
    config: Config,
    ledger: StateManager,
    backups: BackupStore,
    handlers: BTreeMap<String, CategoryHandler>,
    filter: CategoryFilter,
}

impl SyncEngine {
    /// Create an engine
    ///
    /// By default enabled categories applicable to the current platform are
    /// selected.
    #[must_use]
    pub fn new(config: Config, ledger: StateManager, backups: BackupStore) -> Self {
        Self {
            config,
            ledger,
            backups,
            handlers: BTreeMap::new(),
            filter: Box::new(|_, category| {
                category.enabled && is_platform_match(category.platforms.as_deref())
            }),
        }
    }

    /// Replace the category selection predicate
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&str, &CategoryConfig) -> bool + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Configuration the engine runs with
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The ledger
    #[must_use]
    pub const fn ledger(&self) -> &StateManager {
        &self.ledger
    }

    /// Whether a category is selected by the filter
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.config
            .category(name)
            .is_some_and(|category| (self.filter)(name, category))
    }

    /// Names of selected categories, in order
    #[must_use]
    pub fn selected_categories(&self) -> Vec<String> {
        self.config
            .sync_categories
            .iter()
            .filter(|(name, category)| (self.filter)(name, category))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn targets(&self, category: Option<&str>) -> Result<Vec<String>> {
        match category {
            Some(name) if self.config.category(name).is_some() => Ok(vec![name.to_string()]),
            Some(name) => Err(Error::UnknownCategory {
                name: name.to_string(),
            }),
            None => Ok(self.selected_categories()),
        }
    }

    fn handler<'a>(
        handlers: &'a mut BTreeMap<String, CategoryHandler>,
        config: &Config,
        backups: &BackupStore,
        name: &str,
    ) -> Result<&'a mut CategoryHandler> {
        if !handlers.contains_key(name) {
            let category = config.category(name).ok_or_else(|| Error::UnknownCategory {
                name: name.to_string(),
            })?;
            let handler = CategoryHandler::new(
                name,
                category.clone(),
                &config.repository.path,
                config.global_exclude.clone(),
                backups.clone(),
            );
            handlers.insert(name.to_string(), handler);
        }
        handlers.get_mut(name).ok_or_else(|| Error::UnknownCategory {
            name: name.to_string(),
        })
    }

    /// Pending changes of one category, or of every selected category
    ///
    /// A category that cannot be scanned is reported with its error set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] for an unknown category name.
    pub fn get_status(&mut self, category: Option<&str>) -> Result<Vec<CategoryStatus>> {
        let mut statuses = Vec::new();
        for name in self.targets(category)? {
            let handler = Self::handler(&mut self.handlers, &self.config, &self.backups, &name)?;
            let status = handler.get_status(&self.ledger).unwrap_or_else(|e| {
                tracing::warn!("Cannot scan category '{name}': {e}");
                CategoryStatus {
                    name: name.clone(),
                    enabled: handler.config().enabled,
                    platforms: handler.config().platforms.clone(),
                    error: Some(e.to_string()),
                    ..CategoryStatus::default()
                }
            });
            statuses.push(status);
        }
        Ok(statuses)
    }

    /// Synchronize one category, or every selected category
    ///
    /// A category that fails as a whole is recorded and the run moves on; an
    /// abort stops the run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] for an unknown category name.
    pub fn sync(
        &mut self,
        category: Option<&str>,
        options: &SyncOptions,
        mut resolver: Option<&mut dyn ConflictResolver>,
    ) -> Result<SyncResult> {
        let targets = self.targets(category)?;
        let mut result = SyncResult {
            total_categories: targets.len(),
            ..SyncResult::default()
        };

        for name in targets {
            let handler = Self::handler(&mut self.handlers, &self.config, &self.backups, &name)?;
            let resolver = resolver
                .as_deref_mut()
                .map(|r| r as &mut dyn ConflictResolver);
            let outcome = handler.sync(&mut self.ledger, options, resolver);
            let category_result = match outcome {
                Ok(category_result) => category_result,
                Err(e) => {
                    tracing::warn!("Category '{name}' failed: {e}");
                    handler.reset_cache();
                    result.category_errors.insert(name, e.to_string());
                    continue;
                }
            };

            result.total_items += category_result.total;
            result.synced_items += category_result.synced;
            result.skipped_items += category_result.skipped;
            result.conflicts += category_result.conflicts;
            result.errors += category_result.errors;
            if category_result
                .settings_result
                .as_ref()
                .is_some_and(|settings| settings.file_modified)
            {
                result.settings_ensured += 1;
            }
            if category_result.success() {
                result.synced_categories += 1;
            }

            let aborted = category_result.aborted;
            result.category_results.insert(name, category_result);
            if aborted {
                result.aborted = true;
                break;
            }
        }

        Ok(result)
    }

    /// Forget ledger entries of one category, or all of them
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown category or if the ledger cannot be
    /// written.
    pub fn reset_state(&mut self, category: Option<&str>) -> Result<()> {
        match category {
            Some(name) => {
                if self.config.category(name).is_none() {
                    return Err(Error::UnknownCategory {
                        name: name.to_string(),
                    });
                }
                let removed = self.ledger.clear_category(name)?;
                tracing::info!("Removed {removed} ledger entries of '{name}'");
                if let Some(handler) = self.handlers.get_mut(name) {
                    handler.reset_cache();
                }
            }
            None => {
                self.ledger.reset()?;
                self.handlers.clear();
            }
        }
        Ok(())
    }

    /// Create the repository directories of the selected categories
    ///
    /// For a category pinned to a single file (a repository path with an
    /// extension) its parent directory is created.
    /// Returns the directories that were created.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns or if a directory cannot be
    /// created.
    pub fn ensure_repo_structure(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for name in self.selected_categories() {
            let Some(category) = self.config.category(&name) else {
                continue;
            };
            let scanner = Scanner::new(
                &name,
                category,
                &self.config.repository.path,
                &self.config.global_exclude,
            )?;
            let pinned_file = scanner.is_single_file() && category.repo_path.extension().is_some();
            let dir = if pinned_file {
                match scanner.repo_root().parent() {
                    Some(parent) => parent.to_path_buf(),
                    None => continue,
                }
            } else {
                scanner.repo_root().to_path_buf()
            };

            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
                tracing::debug!("Created {}", dir.display());
                created.push(dir);
            }
        }
        Ok(created)
    }
}
