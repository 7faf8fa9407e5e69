//! Common types and utilities for command execution

use std::path::{Path, PathBuf};

use anyhow::Context;
use sccs_core::sync::BackupStore;
use sccs_core::{Config, ConfigLoader, StateManager, SyncEngine};

/// Options shared by every command
pub struct CommandOptions<'a> {
    /// Enable verbose output
    pub verbose: bool,
    /// Path to custom config file
    pub config_path: Option<&'a Path>,
}

impl<'a> CommandOptions<'a> {
    /// Create new command options
    #[must_use]
    pub const fn new(verbose: bool, config_path: Option<&'a Path>) -> Self {
        Self {
            verbose,
            config_path,
        }
    }

    /// Location of the configuration file
    pub fn config_file(&self) -> anyhow::Result<PathBuf> {
        match self.config_path {
            Some(path) => Ok(path.to_path_buf()),
            None => ConfigLoader::default_path()
                .context("Failed to determine the configuration directory"),
        }
    }

    /// Load and validate the configuration
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let path = self.config_file()?;
        if self.verbose {
            println!("Config file: {}", path.display());
        }
        ConfigLoader::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Build an engine with the configured ledger and backup locations
    pub fn engine(&self) -> anyhow::Result<SyncEngine> {
        let config = self.load_config()?;

        let state_file = config
            .state_file
            .clone()
            .or_else(StateManager::default_path)
            .context("Failed to determine the sync state location")?;
        let ledger = StateManager::open(&state_file);
        if let Some(warning) = ledger.load_warning() {
            eprintln!(
                "Warning: sync state {} could not be read and was ignored ({warning}).\n\
                 Every item is treated as never synced.",
                state_file.display()
            );
        }

        let backups = config
            .backup_dir
            .clone()
            .or_else(BackupStore::default_root)
            .map_or_else(BackupStore::disabled, BackupStore::new);

        if self.verbose {
            println!("Repository: {}", config.repository.path.display());
            println!("Sync state: {}", state_file.display());
            if let Some(root) = backups.root() {
                println!("Backups:    {}", root.display());
            }
        }

        Ok(SyncEngine::new(config, ledger, backups))
    }
}
