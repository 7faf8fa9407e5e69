//! Persistent ledger of the last synchronized state of each item

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic;
use crate::comparison::ContentHash;
use crate::error::{Error, Result};

const LEDGER_VERSION: &str = "2.0";

/// Last synchronized state of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    /// Item name
    pub name: String,
    /// Owning category
    pub category: String,
    /// Content hash both sides agreed on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<ContentHash>,
    /// Local mtime at sync time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_mtime: Option<f64>,
    /// Repository mtime at sync time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_mtime: Option<f64>,
    /// When the entry was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
    /// Action that produced the entry (`copy_to_repo`, `merged`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
}

/// Ledger document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Format version
    #[serde(default = "default_version")]
    pub version: String,
    /// Time of the last save
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    /// Entries keyed by `category:name`
    #[serde(default)]
    pub items: BTreeMap<String, ItemState>,
}

fn default_version() -> String {
    LEDGER_VERSION.to_string()
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            version: default_version(),
            last_sync: None,
            items: BTreeMap::new(),
        }
    }
}

fn key(category: &str, name: &str) -> String {
    format!("{category}:{name}")
}

/// Values recorded for an item after a successful action
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    /// Agreed content hash
    pub content_hash: Option<ContentHash>,
    /// Local mtime
    pub local_mtime: Option<f64>,
    /// Repository mtime
    pub repo_mtime: Option<f64>,
    /// Action name
    pub action: String,
}

/// Owner of the ledger file
///
/// A missing file is an empty ledger. An unreadable or unparsable file is also
/// treated as empty; the reason is kept in [`StateManager::load_warning`].
#[derive(Debug)]
pub struct StateManager {
    path: Option<PathBuf>,
    state: SyncState,
    load_warning: Option<String>,
}

impl StateManager {
    /// Default ledger location (`<config_dir>/sccs/sync_state.yaml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sccs").join("sync_state.yaml"))
    }

    /// Open the ledger at `path`
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (state, load_warning) = match Self::load(&path) {
            Ok(state) => (state, None),
            Err(reason) => {
                tracing::warn!(
                    "Ledger {} is unreadable, starting from an empty ledger: {reason}",
                    path.display()
                );
                (SyncState::default(), Some(reason))
            }
        };

        Self {
            path: Some(path),
            state,
            load_warning,
        }
    }

    /// A ledger that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: SyncState::default(),
            load_warning: None,
        }
    }

    fn load(path: &Path) -> std::result::Result<SyncState, String> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SyncState::default()),
            Err(e) => return Err(e.to_string()),
        };

        if content.trim().is_empty() {
            return Ok(SyncState::default());
        }

        match serde_yml::from_str::<SyncState>(&content) {
            Ok(state) => Ok(state),
            Err(yaml_err) => serde_json::from_str::<SyncState>(&content)
                .map_err(|_| yaml_err.to_string()),
        }
    }

    /// Ledger file location, `None` for in-memory ledgers
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Why the ledger file was ignored on load, if it was
    #[must_use]
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Current ledger contents
    #[must_use]
    pub const fn state(&self) -> &SyncState {
        &self.state
    }

    /// Entry for an item
    #[must_use]
    pub fn get_item(&self, category: &str, name: &str) -> Option<&ItemState> {
        self.state.items.get(&key(category, name))
    }

    /// Last agreed hash for an item
    #[must_use]
    pub fn item_hash(&self, category: &str, name: &str) -> Option<&ContentHash> {
        self.get_item(category, name)
            .and_then(|item| item.content_hash.as_ref())
    }

    /// Entries belonging to a category
    #[must_use]
    pub fn items_for_category(&self, category: &str) -> Vec<&ItemState> {
        self.state
            .items
            .values()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Record an item's state and persist the ledger
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerWrite`] if the ledger cannot be saved.
    pub fn update_item(&mut self, category: &str, name: &str, update: ItemUpdate) -> Result<()> {
        self.state.items.insert(
            key(category, name),
            ItemState {
                name: name.to_string(),
                category: category.to_string(),
                content_hash: update.content_hash,
                local_mtime: update.local_mtime,
                repo_mtime: update.repo_mtime,
                last_synced: Some(Utc::now()),
                last_action: Some(update.action),
            },
        );
        self.save()
    }

    /// Remove an item's entry and persist the ledger
    ///
    /// Returns whether an entry existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerWrite`] if the ledger cannot be saved.
    pub fn remove_item(&mut self, category: &str, name: &str) -> Result<bool> {
        let removed = self.state.items.remove(&key(category, name)).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Remove entries of a category whose item name fails `present`
    ///
    /// Returns how many entries were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerWrite`] if the ledger cannot be saved.
    pub fn prune_category(
        &mut self,
        category: &str,
        present: impl Fn(&str) -> bool,
    ) -> Result<usize> {
        let before = self.state.items.len();
        self.state
            .items
            .retain(|_, item| item.category != category || present(&item.name));
        let removed = before - self.state.items.len();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    /// Remove all entries of a category, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerWrite`] if the ledger cannot be saved.
    pub fn clear_category(&mut self, category: &str) -> Result<usize> {
        let before = self.state.items.len();
        self.state.items.retain(|_, item| item.category != category);
        let removed = before - self.state.items.len();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    /// Drop every entry
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerWrite`] if the ledger cannot be saved.
    pub fn reset(&mut self) -> Result<()> {
        self.state = SyncState::default();
        self.load_warning = None;
        self.save()
    }

    /// Stamp `last_sync` and write the ledger atomically
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerWrite`] on serialization or I/O failure.
    pub fn save(&mut self) -> Result<()> {
        self.state.last_sync = Some(Utc::now());

        let Some(path) = &self.path else {
            return Ok(());
        };

        let ledger_error = |reason: String| Error::LedgerWrite {
            path: path.clone(),
            reason,
        };
        let yaml = serde_yml::to_string(&self.state).map_err(|e| ledger_error(e.to_string()))?;
        atomic::write_atomic(path, yaml.as_bytes()).map_err(|e| ledger_error(e.to_string()))
    }
}
