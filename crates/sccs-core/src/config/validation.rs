//! Configuration validation and error reporting

use super::platform::KNOWN_PLATFORMS;
use super::types::Config;
use crate::error::{Error, Result};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new config validator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate a configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(config: &Config) -> Result<()> {
        if config.repository.path.as_os_str().is_empty() {
            return Err(Error::config("repository.path cannot be empty"));
        }

        for pattern in &config.global_exclude {
            if pattern.trim().is_empty() {
                return Err(Error::config("global_exclude pattern cannot be empty"));
            }
        }

        for (name, category) in &config.sync_categories {
            if name.trim().is_empty() {
                return Err(Error::config("Category name cannot be empty"));
            }
            if name.contains(':') {
                return Err(Error::config(format!(
                    "Category name '{name}' cannot contain ':'"
                )));
            }

            if category.local_path.as_os_str().is_empty() {
                return Err(Error::config(format!("Category '{name}' has no local_path")));
            }
            if category.repo_path.as_os_str().is_empty() {
                return Err(Error::config(format!("Category '{name}' has no repo_path")));
            }

            let patterns = category
                .include
                .iter()
                .chain(&category.exclude)
                .chain(category.item_pattern.iter());
            for pattern in patterns {
                if pattern.trim().is_empty() {
                    return Err(Error::config(format!(
                        "Category '{name}' has an empty pattern"
                    )));
                }
            }

            if let Some(platforms) = &category.platforms {
                for platform in platforms {
                    if !KNOWN_PLATFORMS.contains(&platform.as_str()) {
                        return Err(Error::config(format!(
                            "Category '{name}' has unknown platform '{platform}' (expected one of: {})",
                            KNOWN_PLATFORMS.join(", ")
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::CategoryConfig;

    fn config_with(name: &str, category: CategoryConfig) -> Config {
        let mut config = Config::new("/tmp/repo");
        config.sync_categories.insert(name.to_string(), category);
        config
    }

    #[test]
    fn test_validate_empty_config() {
        let config = Config::new("/tmp/repo");
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_colon_in_name() {
        let config = config_with("bad:name", CategoryConfig::new("/a", "b"));
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("cannot contain ':'"));
    }

    #[test]
    fn test_validate_empty_pattern() {
        let mut category = CategoryConfig::new("/a", "b");
        category.exclude.push("   ".to_string());

        let err = ConfigValidator::validate(&config_with("agents", category)).unwrap_err();
        assert!(err.to_string().contains("empty pattern"));
    }

    #[test]
    fn test_validate_unknown_platform() {
        let mut category = CategoryConfig::new("/a", "b");
        category.platforms = Some(vec!["solaris".to_string()]);

        let err = ConfigValidator::validate(&config_with("agents", category)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
        assert!(err.to_string().contains("solaris"));
    }

    #[test]
    fn test_validate_valid_config() {
        let mut category = CategoryConfig::new("/a", "b");
        category.platforms = Some(vec!["linux".to_string(), "macos".to_string()]);
        category.item_pattern = Some("*.md".to_string());

        assert!(ConfigValidator::validate(&config_with("agents", category)).is_ok());
    }
}
