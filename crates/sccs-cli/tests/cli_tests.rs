use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temporary local tree, repository and config file
struct Fixture {
    _tmp: TempDir,
    local: PathBuf,
    repo: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("home").join("agents");
        let repo = tmp.path().join("repo");
        fs::create_dir_all(&local).unwrap();
        fs::create_dir_all(&repo).unwrap();

        let config = tmp.path().join("config.yaml");
        let yaml = format!(
            "repository:\n  path: {repo}\n\
             state_file: {state}\n\
             backup_dir: {backups}\n\
             sync_categories:\n  \
               agents:\n    \
                 description: Agent definitions\n    \
                 local_path: {local}\n    \
                 repo_path: agents\n    \
                 item_pattern: \"*.md\"\n",
            repo = repo.display(),
            state = tmp.path().join("state").join("sync_state.yaml").display(),
            backups = tmp.path().join("backups").display(),
            local = local.display(),
        );
        fs::write(&config, yaml).unwrap();

        Self {
            _tmp: tmp,
            local,
            repo,
            config,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sccs").unwrap();
        cmd.env_remove("SCCS_CONFIG").arg("--config").arg(&self.config);
        cmd
    }

    fn repo_file(&self, name: &str) -> PathBuf {
        self.repo.join("agents").join(name)
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_help_output() {
    let mut cmd = Command::cargo_bin("sccs").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skills, Commands and Configs Sync"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("categories"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_version_output() {
    let mut cmd = Command::cargo_bin("sccs").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("sccs").unwrap();
    cmd.env_remove("SCCS_CONFIG")
        .arg("--config")
        .arg(tmp.path().join("nope.yaml"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_categories_lists_configured_categories() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("agents (bidirectional)"))
        .stdout(predicate::str::contains("Agent definitions"));
}

#[test]
fn test_status_then_sync_then_clean_status() {
    let fixture = Fixture::new();
    write(&fixture.local.join("reviewer.md"), "review carefully\n");

    fixture
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[agents] 1 items"))
        .stdout(predicate::str::contains("reviewer.md"));

    fixture
        .cmd()
        .args(["sync", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Sync Summary ==="))
        .stdout(predicate::str::contains("Synced:    1"));

    assert_eq!(
        fs::read_to_string(fixture.repo_file("reviewer.md")).unwrap(),
        "review carefully\n"
    );

    fixture
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Everything is in sync."));
}

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = Fixture::new();
    write(&fixture.local.join("reviewer.md"), "review carefully\n");

    fixture
        .cmd()
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    assert!(!fixture.repo_file("reviewer.md").exists());
}

#[test]
fn test_conflict_left_pending_then_forced() {
    let fixture = Fixture::new();
    let local_file = fixture.local.join("reviewer.md");
    write(&local_file, "base\n");
    fixture
        .cmd()
        .args(["sync", "--non-interactive"])
        .assert()
        .success();

    write(&local_file, "local edit\n");
    write(&fixture.repo_file("reviewer.md"), "repo edit\n");

    fixture
        .cmd()
        .args(["sync", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Conflicts: 1"))
        .stdout(predicate::str::contains("left unresolved"));
    assert_eq!(fs::read_to_string(&local_file).unwrap(), "local edit\n");

    fixture
        .cmd()
        .args(["sync", "--force", "repo"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&local_file).unwrap(), "repo edit\n");
}

#[test]
fn test_diff_of_single_item() {
    let fixture = Fixture::new();
    write(&fixture.local.join("reviewer.md"), "one\ntwo\n");
    write(&fixture.repo_file("reviewer.md"), "one\nthree\n");

    fixture
        .cmd()
        .args(["diff", "agents", "reviewer.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("two"))
        .stdout(predicate::str::contains("three"));

    fixture
        .cmd()
        .args(["diff", "agents", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_unknown_category_fails() {
    let fixture = Fixture::new();
    fixture
        .cmd()
        .args(["sync", "-c", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn test_reset_clears_state() {
    let fixture = Fixture::new();
    write(&fixture.local.join("reviewer.md"), "same\n");
    fixture
        .cmd()
        .args(["sync", "--non-interactive"])
        .assert()
        .success();

    fixture
        .cmd()
        .args(["reset", "-c", "agents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync state of 'agents' cleared."));

    // Identical content on both sides is adopted again without changes
    fixture
        .cmd()
        .args(["sync", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Success"));
}
