//! Integration tests for the scanner module

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::Scanner;
use crate::config::{default_global_exclude, CategoryConfig, ItemType};
use crate::sync::{ItemKind, Side};

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn names(category: &CategoryConfig, repo_base: &Path) -> Vec<String> {
    let scanner = Scanner::new("test", category, repo_base, &default_global_exclude()).unwrap();
    scanner.scan().unwrap().items.into_keys().collect()
}

#[test]
fn test_file_items_union_of_both_sides() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("local/agents");
    let repo = tmp.path().join("repo");

    write(&local, "a.md", "a");
    write(&local, "shared.md", "local");
    write(&repo, "agents/b.md", "b");
    write(&repo, "agents/shared.md", "repo");
    write(&local, "api-token.md", "never synced");

    let mut category = CategoryConfig::new(&local, "agents");
    category.item_pattern = Some("*.md".to_string());

    assert_eq!(names(&category, &repo), vec!["a.md", "b.md", "shared.md"]);
}

#[test]
fn test_directory_items_with_marker() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("local/skills");
    let repo = tmp.path().join("repo");

    write(&local, "alpha/SKILL.md", "alpha");
    write(&local, "alpha/ref/notes.md", "notes");
    write(&local, "scratch/readme.md", "no marker");
    write(&repo, "skills/beta/SKILL.md", "beta");

    let mut category = CategoryConfig::new(&local, "skills");
    category.item_type = ItemType::Directory;
    category.item_marker = Some("SKILL.md".to_string());

    let scanner = Scanner::new("skills", &category, &repo, &[]).unwrap();
    let result = scanner.scan().unwrap();

    let found: Vec<_> = result.items.keys().cloned().collect();
    assert_eq!(found, vec!["alpha", "beta"]);

    let beta = &result.items["beta"];
    assert_eq!(beta.kind, ItemKind::Directory);
    assert!(!beta.exists(Side::Local));
    assert!(beta.exists(Side::Repo));
    assert_eq!(beta.path(Side::Local), local.join("beta"));
}

#[test]
fn test_single_pinned_file() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("home/starship.toml");
    let repo = tmp.path().join("repo");
    write(tmp.path(), "home/starship.toml", "format = '$all'");

    let category = CategoryConfig::new(&local, "config/starship.toml");
    let scanner = Scanner::new("starship", &category, &repo, &[]).unwrap();
    let result = scanner.scan().unwrap();

    assert_eq!(result.items.len(), 1);
    let item = &result.items["starship.toml"];
    assert_eq!(item.kind, ItemKind::Single);
    assert_eq!(item.path(Side::Repo), repo.join("config/starship.toml"));
}

#[test]
fn test_single_file_absent_everywhere() {
    let tmp = TempDir::new().unwrap();
    let category = CategoryConfig::new(tmp.path().join("none.toml"), "none.toml");
    assert!(names(&category, &tmp.path().join("repo")).is_empty());
}

#[test]
fn test_recursive_when_include_has_slash() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("local");
    let repo = tmp.path().join("repo");

    write(&local, "top.md", "top");
    write(&local, "hooks/pre.sh", "pre");
    write(&local, "hooks/.git/config", "git");
    write(&local, "other/x.sh", "x");

    let mut category = CategoryConfig::new(&local, "dotfiles");
    category.include = vec!["hooks/*".to_string(), "*.md".to_string()];

    assert_eq!(names(&category, &repo), vec!["hooks/pre.sh", "top.md"]);
}

#[test]
fn test_mixed_directory_wins() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("local");
    let repo = tmp.path().join("repo");

    write(&local, "notes.md", "file");
    write(&local, "bundle/SKILL.md", "dir");
    write(&repo, "mixed/bundle", "a file on the repo side");

    let mut category = CategoryConfig::new(&local, "mixed");
    category.item_type = ItemType::Mixed;

    let scanner = Scanner::new("mixed", &category, &repo, &[]).unwrap();
    let result = scanner.scan().unwrap();

    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items["bundle"].kind, ItemKind::Directory);
    assert_eq!(result.items["notes.md"].kind, ItemKind::File);
}

#[test]
fn test_missing_roots_yield_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut category = CategoryConfig::new(tmp.path().join("missing"), "missing");
    category.item_type = ItemType::Directory;

    assert!(names(&category, tmp.path()).is_empty());
}
