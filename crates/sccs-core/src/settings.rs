//! Non-destructive updates of JSON settings files
//!
//! A category may name a settings file and a set of top-level entries that must
//! exist in it. Missing keys are added after the category is synchronized;
//! keys that are already present are never overwritten.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::atomic;
use crate::config::SettingsEnsure;
use crate::sync::BackupStore;

/// What [`ensure_settings`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsEnsureResult {
    /// Settings file that was inspected
    pub target_file: PathBuf,
    /// Keys that were (or in a dry run would be) added
    pub keys_added: Vec<String>,
    /// Keys that already existed
    pub keys_skipped: Vec<String>,
    /// Whether the file did not exist and was created
    pub file_created: bool,
    /// Whether the file was changed
    pub file_modified: bool,
    /// Backup taken before the change
    pub backup: Option<PathBuf>,
    /// Why the file could not be updated
    pub error: Option<String>,
}

impl SettingsEnsureResult {
    /// Whether the operation completed without error
    #[must_use]
    pub const fn success(&self) -> bool {
        self.error.is_none()
    }

    fn failed(mut self, error: String) -> Self {
        tracing::warn!("Settings ensure for {}: {error}", self.target_file.display());
        self.error = Some(error);
        self
    }
}

/// Add missing top-level `entries` to the JSON object in `target_file`
///
/// Malformed JSON, a non-object root and I/O failures are reported in the
/// result, never returned as errors. In a dry run the result describes the
/// change without writing anything.
#[must_use]
pub fn ensure_settings(
    config: &SettingsEnsure,
    dry_run: bool,
    category: &str,
    backups: &BackupStore,
) -> SettingsEnsureResult {
    let target = &config.target_file;
    let mut result = SettingsEnsureResult {
        target_file: target.clone(),
        ..SettingsEnsureResult::default()
    };

    if config.entries.is_empty() {
        return result;
    }

    let exists = target.exists();
    let existing: Map<String, Value> = if exists {
        let raw = match fs::read_to_string(target) {
            Ok(raw) => raw,
            Err(e) => return result.failed(format!("Cannot read {}: {e}", target.display())),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return result.failed(format!("JSON root is not an object in {}", target.display()));
            }
            Err(e) => return result.failed(format!("Malformed JSON in {}: {e}", target.display())),
        }
    } else if config.create_if_missing {
        Map::new()
    } else {
        return result;
    };

    let (skipped, added): (Vec<&String>, Vec<&String>) =
        config.entries.keys().partition(|key| existing.contains_key(*key));
    result.keys_skipped = skipped.into_iter().cloned().collect();
    result.keys_added = added.into_iter().cloned().collect();

    if result.keys_added.is_empty() {
        return result;
    }
    result.file_created = !exists;
    result.file_modified = true;

    if dry_run {
        tracing::info!(
            "[DRY RUN] Would add {} key(s) to {}",
            result.keys_added.len(),
            target.display()
        );
        return result;
    }

    let mut merged = existing;
    for key in &result.keys_added {
        if let Some(value) = config.entries.get(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    if config.backup_before_modify && exists {
        match backups.create_backup(target, category) {
            Ok(backup) => result.backup = backup,
            Err(e) => return result.failed(format!("Failed to create backup: {e}")),
        }
    }

    let mut content = match serde_json::to_string_pretty(&Value::Object(merged)) {
        Ok(content) => content,
        Err(e) => return result.failed(format!("Cannot serialize settings: {e}")),
    };
    content.push('\n');

    if let Err(e) = atomic::write_atomic(target, content.as_bytes()) {
        return result.failed(format!("Failed to write {}: {e}", target.display()));
    }

    tracing::info!(
        "Added {} key(s) to {}",
        result.keys_added.len(),
        target.display()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn ensure(target: PathBuf, entries: Value) -> SettingsEnsure {
        let Value::Object(entries) = entries else {
            panic!("entries must be an object");
        };
        SettingsEnsure {
            target_file: target,
            entries,
            create_if_missing: true,
            backup_before_modify: true,
        }
    }

    fn read_json(path: &std::path::Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_adds_missing_keys_only() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("settings.json");
        fs::write(&target, r#"{"theme": "dark", "keep": 1}"#).unwrap();
        let config = ensure(target.clone(), json!({"theme": "light", "statusLine": {"type": "command"}}));
        let backups = BackupStore::new(tmp.path().join("backups"));

        let result = ensure_settings(&config, false, "settings", &backups);

        assert!(result.success());
        assert_eq!(result.keys_added, vec!["statusLine".to_string()]);
        assert_eq!(result.keys_skipped, vec!["theme".to_string()]);
        assert!(result.file_modified);
        assert!(!result.file_created);
        assert!(result.backup.is_some());
        assert_eq!(
            read_json(&target),
            json!({"theme": "dark", "keep": 1, "statusLine": {"type": "command"}})
        );
    }

    #[test]
    fn test_existing_key_order_is_kept() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("settings.json");
        fs::write(&target, r#"{"zeta": 1, "alpha": 2, "model": "x"}"#).unwrap();
        let config = ensure(target.clone(), json!({"beta": 3}));

        let result = ensure_settings(&config, false, "c", &BackupStore::disabled());
        assert!(result.file_modified);

        let written = fs::read_to_string(&target).unwrap();
        let position = |key: &str| written.find(&format!("\"{key}\"")).unwrap();
        assert!(position("zeta") < position("alpha"));
        assert!(position("alpha") < position("model"));
        assert!(position("model") < position("beta"));
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("settings.json");
        let config = ensure(target.clone(), json!({"a": true}));

        let first = ensure_settings(&config, false, "c", &BackupStore::disabled());
        assert!(first.file_created);

        let second = ensure_settings(&config, false, "c", &BackupStore::disabled());
        assert!(!second.file_modified);
        assert_eq!(second.keys_skipped, vec!["a".to_string()]);
    }

    #[test]
    fn test_missing_file_not_created_when_disabled() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("settings.json");
        let mut config = ensure(target.clone(), json!({"a": 1}));
        config.create_if_missing = false;

        let result = ensure_settings(&config, false, "c", &BackupStore::disabled());

        assert!(result.success());
        assert!(!result.file_modified);
        assert!(!target.exists());
    }

    #[test]
    fn test_malformed_and_non_object_are_reported() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("settings.json");
        let config = ensure(target.clone(), json!({"a": 1}));

        fs::write(&target, "{not json").unwrap();
        let malformed = ensure_settings(&config, false, "c", &BackupStore::disabled());
        assert!(malformed.error.unwrap().contains("Malformed JSON"));

        fs::write(&target, "[1, 2]").unwrap();
        let array = ensure_settings(&config, false, "c", &BackupStore::disabled());
        assert!(array.error.unwrap().contains("not an object"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("settings.json");
        let config = ensure(target.clone(), json!({"a": 1}));

        let result = ensure_settings(&config, true, "c", &BackupStore::disabled());

        assert!(result.file_modified);
        assert_eq!(result.keys_added, vec!["a".to_string()]);
        assert!(!target.exists());
    }
}
