//! Staged writes that replace their destination in a single rename
//!
//! Content is written to a sibling temporary path (`.<name>.<pid>.tmp`) in the
//! destination's directory, flushed, then renamed over the destination. A
//! staged write that is dropped without [`StagedFile::commit`] removes its
//! temporary path and leaves the destination untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::PatternMatcher;
use crate::error::{Error, Result};

fn sibling_path(dest: &Path, suffix: &str) -> Result<PathBuf> {
    let name = dest
        .file_name()
        .ok_or_else(|| Error::io(dest, std::io::Error::other("path has no file name")))?;
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!(
        ".{}.{}.{suffix}",
        name.to_string_lossy(),
        std::process::id()
    )))
}

fn ensure_parent(dest: &Path) -> Result<()> {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn relative<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root)
        .map_err(|e| Error::io(path, std::io::Error::other(e)))
}

fn copy_entry(entry: &walkdir::DirEntry, dest: &Path) -> Result<()> {
    if entry.file_type().is_dir() {
        fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))
    } else {
        fs::copy(entry.path(), dest)
            .map(|_| ())
            .map_err(|e| Error::io(entry.path(), e))
    }
}

/// Recursively copy the directory `source` to `target`
///
/// Entries matched by `exclude` (relative to `source`) are not copied.
///
/// # Errors
///
/// Returns an error if any entry cannot be read or written.
pub(crate) fn copy_tree(
    source: &Path,
    target: &Path,
    exclude: Option<&PatternMatcher>,
) -> Result<()> {
    let walker = WalkDir::new(source).follow_links(false).into_iter();
    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || !exclude.is_some_and(|m| {
                e.path()
                    .strip_prefix(source)
                    .is_ok_and(|rel| m.is_excluded(rel, e.file_type().is_dir()))
            })
    }) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;
        let rel = relative(entry.path(), source)?;
        copy_entry(&entry, &target.join(rel))?;
    }
    Ok(())
}

/// Copy the entries of `existing` matched by `exclude` into `target`
///
/// Excluded content never travels between sides, so a tree replaced by a copy
/// keeps its own excluded files.
fn carry_excluded(existing: &Path, target: &Path, exclude: &PatternMatcher) -> Result<()> {
    let mut walker = WalkDir::new(existing).follow_links(false).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(existing).to_path_buf();
            Error::io(path, e.into())
        })?;
        let rel = relative(entry.path(), existing)?;
        let is_dir = entry.file_type().is_dir();
        if !exclude.is_excluded(rel, is_dir) {
            continue;
        }

        let dest = target.join(rel);
        if is_dir {
            copy_tree(entry.path(), &dest, None)?;
            walker.skip_current_dir();
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            copy_entry(&entry, &dest)?;
        }
    }
    Ok(())
}

/// A file written to a temporary sibling, waiting to be renamed into place
#[derive(Debug)]
pub struct StagedFile {
    temp: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Stage `content` for `dest`
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or temp file cannot be written.
    pub fn write(dest: &Path, content: &[u8]) -> Result<Self> {
        ensure_parent(dest)?;
        let temp = sibling_path(dest, "tmp")?;
        let staged = Self {
            temp,
            dest: dest.to_path_buf(),
            committed: false,
        };

        let mut file = File::create(&staged.temp).map_err(|e| Error::io(&staged.temp, e))?;
        file.write_all(content)
            .map_err(|e| Error::io(&staged.temp, e))?;
        file.sync_all().map_err(|e| Error::io(&staged.temp, e))?;

        Ok(staged)
    }

    /// Stage a copy of the file at `source` for `dest`, keeping its permissions
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the temp file written.
    pub fn copy(source: &Path, dest: &Path) -> Result<Self> {
        ensure_parent(dest)?;
        let temp = sibling_path(dest, "tmp")?;
        let staged = Self {
            temp,
            dest: dest.to_path_buf(),
            committed: false,
        };

        fs::copy(source, &staged.temp).map_err(|e| Error::io(source, e))?;
        File::open(&staged.temp)
            .and_then(|f| f.sync_all())
            .map_err(|e| Error::io(&staged.temp, e))?;

        Ok(staged)
    }

    /// Temporary path holding the staged content
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Rename the staged content over the destination
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails; the temp file is then removed.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp, &self.dest).map_err(|e| Error::io(&self.dest, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// A directory tree copied to a temporary sibling, waiting to be swapped in
#[derive(Debug)]
pub struct StagedDir {
    temp: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl StagedDir {
    /// Stage a recursive copy of `source` for `dest`
    ///
    /// Entries matched by `exclude` are not copied from `source`; those already
    /// under `dest` are carried into the staged tree.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry of the source tree cannot be copied.
    pub fn copy(source: &Path, dest: &Path, exclude: Option<&PatternMatcher>) -> Result<Self> {
        ensure_parent(dest)?;
        let temp = sibling_path(dest, "tmp")?;
        if temp.exists() {
            fs::remove_dir_all(&temp).map_err(|e| Error::io(&temp, e))?;
        }
        let staged = Self {
            temp,
            dest: dest.to_path_buf(),
            committed: false,
        };

        copy_tree(source, &staged.temp, exclude)?;
        if let Some(matcher) = exclude {
            if dest.is_dir() {
                carry_excluded(dest, &staged.temp, matcher)?;
            }
        }

        Ok(staged)
    }

    /// Swap the staged tree in place of the destination
    ///
    /// The old tree is moved aside, the new one renamed in, then the old tree
    /// is removed. If the second rename fails the old tree is restored.
    ///
    /// # Errors
    ///
    /// Returns an error if either rename fails.
    pub fn commit(mut self) -> Result<()> {
        let aside = sibling_path(&self.dest, "old")?;
        let had_old = self.dest.exists();

        if had_old {
            if aside.exists() {
                fs::remove_dir_all(&aside).map_err(|e| Error::io(&aside, e))?;
            }
            fs::rename(&self.dest, &aside).map_err(|e| Error::io(&self.dest, e))?;
        }

        if let Err(e) = fs::rename(&self.temp, &self.dest) {
            if had_old {
                let _ = fs::rename(&aside, &self.dest);
            }
            return Err(Error::io(&self.dest, e));
        }
        self.committed = true;

        if had_old {
            if let Err(e) = fs::remove_dir_all(&aside) {
                tracing::warn!("Failed to remove old tree {}: {e}", aside.display());
            }
        }
        Ok(())
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_dir_all(&self.temp);
        }
    }
}

/// Atomically write `content` to `dest`
///
/// # Errors
///
/// Returns an error if staging or the final rename fails.
pub fn write_atomic(dest: &Path, content: &[u8]) -> Result<()> {
    StagedFile::write(dest, content)?.commit()
}

/// Atomically replace `dest` with a copy of `source` (file or directory)
///
/// For directories, `exclude` applies as in [`StagedDir::copy`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the source is missing, or an I/O error.
pub fn copy_atomic(source: &Path, dest: &Path, exclude: Option<&PatternMatcher>) -> Result<()> {
    let meta = fs::metadata(source).map_err(|e| Error::io(source, e))?;
    if meta.is_dir() {
        StagedDir::copy(source, dest, exclude)?.commit()
    } else {
        if dest.is_dir() {
            fs::remove_dir_all(dest).map_err(|e| Error::io(dest, e))?;
        }
        StagedFile::copy(source, dest)?.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("a/b/c.txt");

        write_atomic(&dest, b"hello").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "hello");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("c.txt");
        fs::write(&dest, "old").unwrap();

        write_atomic(&dest, b"new").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        let leftovers: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_dropped_stage_leaves_destination_intact() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("c.txt");
        fs::write(&dest, "original").unwrap();

        let staged = StagedFile::write(&dest, b"partial").unwrap();
        let temp = staged.temp_path().to_path_buf();
        assert!(temp.exists());
        drop(staged);

        assert!(!temp.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "original");
    }

    #[test]
    fn test_copy_atomic_directory_swap() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("a.md"), "a").unwrap();
        fs::write(source.join("nested/b.md"), "b").unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.md"), "stale").unwrap();

        copy_atomic(&source, &dest, None).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.md")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dest.join("nested/b.md")).unwrap(), "b");
        assert!(!dest.join("stale.md").exists());
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected leftovers: {names:?}");
    }

    #[test]
    fn test_copy_atomic_directory_honors_excludes() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        fs::create_dir_all(source.join("__pycache__")).unwrap();
        fs::write(source.join("SKILL.md"), "skill").unwrap();
        fs::write(source.join(".env"), "SECRET=source").unwrap();
        fs::write(source.join("__pycache__/x.pyc"), "bytecode").unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join(".env"), "SECRET=dest").unwrap();
        fs::write(dest.join("old.md"), "old").unwrap();

        let matcher = PatternMatcher::with_patterns(
            &[],
            &[".env".to_string(), "__pycache__".to_string()],
        )
        .unwrap();
        copy_atomic(&source, &dest, Some(&matcher)).unwrap();

        assert_eq!(fs::read_to_string(dest.join("SKILL.md")).unwrap(), "skill");
        assert_eq!(fs::read_to_string(dest.join(".env")).unwrap(), "SECRET=dest");
        assert!(!dest.join("__pycache__").exists());
        assert!(!dest.join("old.md").exists());
    }

    #[test]
    fn test_copy_atomic_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = copy_atomic(&tmp.path().join("nope"), &tmp.path().join("dest"), None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }
}
