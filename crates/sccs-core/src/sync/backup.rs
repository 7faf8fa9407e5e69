//! Timestamped backups taken before anything is overwritten or deleted

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::atomic::copy_tree;
use crate::config::PatternMatcher;
use crate::error::{Error, Result};

/// Backup directory, organized by category
#[derive(Debug, Clone)]
pub struct BackupStore {
    root: Option<PathBuf>,
}

impl BackupStore {
    /// Default backup root (`<config_dir>/sccs/backups`)
    #[must_use]
    pub fn default_root() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sccs").join("backups"))
    }

    /// Store backups under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A store that never writes backups
    #[must_use]
    pub const fn disabled() -> Self {
        Self { root: None }
    }

    /// Backup root, `None` when disabled
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Copy `path` to `<root>/<category>/<name>.<YYYYmmdd_HHMMSS>.bak`
    ///
    /// A numeric suffix is appended if that name is taken. Returns `None` if the
    /// store is disabled or `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup cannot be written.
    pub fn create_backup(&self, path: &Path, category: &str) -> Result<Option<PathBuf>> {
        self.create_backup_excluding(path, category, None)
    }

    /// Like [`BackupStore::create_backup`], leaving out directory entries
    /// matched by `exclude`
    ///
    /// # Errors
    ///
    /// Returns an error if the backup cannot be written.
    pub fn create_backup_excluding(
        &self,
        path: &Path,
        category: &str,
        exclude: Option<&PatternMatcher>,
    ) -> Result<Option<PathBuf>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let dir = root.join(category);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let name = path
            .file_name()
            .map_or_else(|| "item".to_string(), |n| n.to_string_lossy().into_owned());
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");

        let mut backup = dir.join(format!("{name}.{timestamp}.bak"));
        let mut counter = 1;
        while backup.exists() {
            backup = dir.join(format!("{name}.{timestamp}.{counter}.bak"));
            counter += 1;
        }

        if path.is_dir() {
            copy_tree(path, &backup, exclude)?;
        } else {
            fs::copy(path, &backup).map_err(|e| Error::io(path, e))?;
        }

        tracing::debug!("Backed up {} to {}", path.display(), backup.display());
        Ok(Some(backup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_file_with_collision_suffix() {
        let tmp = TempDir::new().unwrap();
        let store = BackupStore::new(tmp.path().join("backups"));
        let file = tmp.path().join("agent.md");
        fs::write(&file, "content").unwrap();

        let first = store.create_backup(&file, "agents").unwrap().unwrap();
        let second = store.create_backup(&file, "agents").unwrap().unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with(tmp.path().join("backups/agents")));
        let first_name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(first_name.starts_with("agent.md."));
        assert!(first_name.ends_with(".bak"));
        assert_eq!(fs::read_to_string(&second).unwrap(), "content");
    }

    #[test]
    fn test_backup_directory() {
        let tmp = TempDir::new().unwrap();
        let store = BackupStore::new(tmp.path().join("backups"));
        let dir = tmp.path().join("skill");
        fs::create_dir_all(dir.join("ref")).unwrap();
        fs::write(dir.join("SKILL.md"), "skill").unwrap();
        fs::write(dir.join("ref/a.md"), "a").unwrap();

        let backup = store.create_backup(&dir, "skills").unwrap().unwrap();

        assert_eq!(fs::read_to_string(backup.join("ref/a.md")).unwrap(), "a");
    }

    #[test]
    fn test_backup_directory_excluding() {
        let tmp = TempDir::new().unwrap();
        let store = BackupStore::new(tmp.path().join("backups"));
        let dir = tmp.path().join("skill");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("SKILL.md"), "skill").unwrap();
        fs::write(dir.join(".env"), "SECRET=1").unwrap();

        let matcher = PatternMatcher::with_patterns(&[], &[".env".to_string()]).unwrap();
        let backup = store
            .create_backup_excluding(&dir, "skills", Some(&matcher))
            .unwrap()
            .unwrap();

        assert!(backup.join("SKILL.md").exists());
        assert!(!backup.join(".env").exists());
    }

    #[test]
    fn test_missing_or_disabled() {
        let tmp = TempDir::new().unwrap();
        let store = BackupStore::new(tmp.path().join("backups"));
        assert!(store
            .create_backup(&tmp.path().join("missing"), "c")
            .unwrap()
            .is_none());

        let file = tmp.path().join("a.md");
        fs::write(&file, "a").unwrap();
        assert!(BackupStore::disabled().create_backup(&file, "c").unwrap().is_none());
    }
}
