//! Configuration types and structures

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sync::Side;

/// Synchronization direction mode of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Changes flow both ways
    #[default]
    Bidirectional,
    /// The local side is authoritative
    LocalToRepo,
    /// The repository side is authoritative
    RepoToLocal,
}

impl SyncMode {
    /// The side whose content wins, if the mode has one
    #[must_use]
    pub const fn authoritative(self) -> Option<Side> {
        match self {
            Self::Bidirectional => None,
            Self::LocalToRepo => Some(Side::Local),
            Self::RepoToLocal => Some(Side::Repo),
        }
    }

    /// Whether a change on `side` may be propagated to the other side
    #[must_use]
    pub const fn allows_flow_from(self, side: Side) -> bool {
        match self.authoritative() {
            None => true,
            Some(winner) => matches!(
                (winner, side),
                (Side::Local, Side::Local) | (Side::Repo, Side::Repo)
            ),
        }
    }

    /// Config name of the mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bidirectional => "bidirectional",
            Self::LocalToRepo => "local_to_repo",
            Self::RepoToLocal => "repo_to_local",
        }
    }
}

/// Kind of items a category holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Individual files (or a single pinned file)
    #[default]
    File,
    /// Directories, optionally marked by a marker file
    Directory,
    /// Both files and directories
    Mixed,
}

/// Repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Local checkout of the repository
    pub path: PathBuf,
}

/// JSON settings entries to guarantee after a category sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsEnsure {
    /// JSON file to update
    pub target_file: PathBuf,

    /// Top-level keys that must exist; existing keys are never overwritten
    #[serde(default)]
    pub entries: serde_json::Map<String, serde_json::Value>,

    /// Create the target file if it does not exist
    #[serde(default = "default_true")]
    pub create_if_missing: bool,

    /// Back up the target file before modifying it
    #[serde(default = "default_true")]
    pub backup_before_modify: bool,
}

/// Configuration of a single sync category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Whether this category is synchronized
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Local root (or single file) of the category
    pub local_path: PathBuf,

    /// Root (or single file) relative to the repository path
    pub repo_path: PathBuf,

    /// Direction mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Kind of items
    #[serde(default)]
    pub item_type: ItemType,

    /// File whose presence marks a directory item (e.g. `SKILL.md`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_marker: Option<String>,

    /// Glob applied to file basenames (e.g. `*.md`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_pattern: Option<String>,

    /// Include patterns
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Exclude patterns
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Platforms this category applies to; `None` means all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,

    /// Settings entries to ensure after sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_ensure: Option<SettingsEnsure>,
}

impl CategoryConfig {
    /// A file category with default options
    #[must_use]
    pub fn new(local_path: impl Into<PathBuf>, repo_path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            description: String::new(),
            local_path: local_path.into(),
            repo_path: repo_path.into(),
            sync_mode: SyncMode::default(),
            item_type: ItemType::default(),
            item_marker: None,
            item_pattern: None,
            include: default_include(),
            exclude: Vec::new(),
            platforms: None,
            settings_ensure: None,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Repository settings
    pub repository: RepositoryConfig,

    /// Category definitions by name
    #[serde(default)]
    pub sync_categories: BTreeMap<String, CategoryConfig>,

    /// Patterns excluded from every category
    #[serde(default = "default_global_exclude")]
    pub global_exclude: Vec<String>,

    /// Ledger location override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    /// Backup directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

impl Config {
    /// Configuration with no categories for the given repository
    #[must_use]
    pub fn new(repository: impl Into<PathBuf>) -> Self {
        Self {
            repository: RepositoryConfig {
                path: repository.into(),
            },
            sync_categories: BTreeMap::new(),
            global_exclude: default_global_exclude(),
            state_file: None,
            backup_dir: None,
        }
    }

    /// Look up a category by name
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.sync_categories.get(name)
    }
}

const fn default_true() -> bool {
    true
}

fn default_include() -> Vec<String> {
    vec!["*".to_string()]
}

/// Patterns excluded by default, including security-sensitive files
#[must_use]
pub fn default_global_exclude() -> Vec<String> {
    [
        ".DS_Store",
        "*.swp",
        "*.swo",
        "*~",
        ".git",
        "__pycache__",
        "*.pyc",
        ".env",
        ".env.*",
        "*.local",
        "*.local.*",
        // secrets
        "*token*",
        "*secret*",
        "*credential*",
        "*password*",
        "*.pem",
        "*.key",
        "*.p12",
        "*.pfx",
        "*_rsa",
        "*_ed25519",
        "*_ecdsa",
        "*_dsa",
        "id_rsa*",
        "id_ed25519*",
        "known_hosts",
        ".pypirc",
        ".npmrc",
        ".netrc",
        "fish_variables",
        "*.keychain*",
        "*oauth*",
        "*auth*.json",
        "*.gpg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
