//! Configuration model, loading, and pattern matching
//!
//! This module handles:
//! - YAML parsing with serde
//! - `~` expansion of configured paths
//! - Gitignore-style pattern matching
//! - Platform filtering of categories
//! - Validation and error reporting

mod loader;
mod patterns;
mod platform;
mod types;
mod validation;

pub use loader::{expand_path, ConfigLoader};
pub use patterns::PatternMatcher;
pub use platform::{current_platform, is_platform_match, KNOWN_PLATFORMS};
pub use types::{
    default_global_exclude, CategoryConfig, Config, ItemType, RepositoryConfig, SettingsEnsure,
    SyncMode,
};
pub use validation::ConfigValidator;
