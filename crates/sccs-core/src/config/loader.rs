//! YAML configuration loading with `~` expansion

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::types::Config;
use super::validation::ConfigValidator;
use crate::error::{Error, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default configuration file location (`<config_dir>/sccs/config.yaml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sccs").join("config.yaml"))
    }

    /// Load, expand and validate the configuration at `path`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file is missing,
    /// [`Error::ConfigParse`] if it is not valid YAML for the model, or
    /// [`Error::Config`] if validation fails.
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::parse(&content, path)?;
        tracing::debug!(
            "Loaded {} categories from {}",
            config.sync_categories.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse, expand and validate configuration text
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] or [`Error::Config`].
    pub fn parse(content: &str, origin: &Path) -> Result<Config> {
        let mut config: Config = serde_yml::from_str(content).map_err(|e| Error::ConfigParse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::expand_paths(&mut config);
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    fn expand_paths(config: &mut Config) {
        config.repository.path = expand_path(&config.repository.path);
        config.state_file = config.state_file.as_deref().map(expand_path);
        config.backup_dir = config.backup_dir.as_deref().map(expand_path);

        for category in config.sync_categories.values_mut() {
            category.local_path = expand_path(&category.local_path);
            if let Some(ensure) = category.settings_ensure.as_mut() {
                ensure.target_file = expand_path(&ensure.target_file);
            }
        }
    }
}

/// Expand a leading `~` to the home directory and normalize the result
///
/// Relative paths without `~` are returned unchanged.
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    let mut components = path.components();
    let expanded = match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => return path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        dunce::simplified(&expanded).to_path_buf()
    } else {
        expanded
    }
}
