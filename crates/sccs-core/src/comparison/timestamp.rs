//! Modification times for files and directory trees

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

fn seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

fn modified(path: &Path) -> Option<f64> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(seconds)
}

/// Modification time in seconds since the epoch
///
/// For a directory this is the most recent mtime of the directory itself or
/// any file inside it. Returns `None` if the path does not exist.
#[must_use]
pub fn mtime(path: &Path) -> Option<f64> {
    let own = modified(path)?;
    if !path.is_dir() {
        return Some(own);
    }

    let newest = WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| modified(e.path()))
        .fold(own, f64::max);

    Some(newest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path() {
        let tmp = TempDir::new().unwrap();
        assert!(mtime(&tmp.path().join("missing")).is_none());
    }

    #[test]
    fn test_file_mtime() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let t = mtime(&file).unwrap();
        assert!(t > 0.0);
    }

    #[test]
    fn test_directory_uses_newest_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("skill");
        fs::create_dir_all(dir.join("nested")).unwrap();
        let file = dir.join("nested/newer.md");
        fs::write(&file, "x").unwrap();

        let future = SystemTime::now() + Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&file)
            .unwrap()
            .set_modified(future)
            .unwrap();

        let dir_time = mtime(&dir).unwrap();
        assert!((dir_time - seconds(future)).abs() < 1.0);
    }
}
