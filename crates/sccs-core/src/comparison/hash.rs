//! Content addressing using SHA-256

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::PatternMatcher;
use crate::error::{Error, Result};

/// Hex-encoded SHA-256 digest of an item's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    fn from_hasher(hasher: Sha256) -> Self {
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    /// Hex digest string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight hex characters, for display
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn stream_into(hasher: &mut Sha256, path: &Path, length_prefixed: bool) -> Result<()> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    if length_prefixed {
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len();
        hasher.update(len.to_le_bytes());
    }

    let mut reader = BufReader::new(file);
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| Error::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(())
}

/// Digest of in-memory content
#[must_use]
pub fn content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    ContentHash::from_hasher(hasher)
}

/// Digest of a regular file's bytes, streamed in 8 KiB chunks
///
/// Returns `None` if the path does not exist or is not a regular file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn file_hash(path: &Path) -> Result<Option<ContentHash>> {
    if !path.is_file() {
        return Ok(None);
    }

    let mut hasher = Sha256::new();
    stream_into(&mut hasher, path, false)?;
    Ok(Some(ContentHash::from_hasher(hasher)))
}

/// Digest of a directory tree
///
/// Files are visited in order of their `/`-joined relative path. For each file
/// the relative path is fed first (when `include_names`), then the content.
/// Both are preceded by their length as a little-endian `u64`, so no two trees
/// produce the same stream. Paths matched by `exclude` are skipped.
///
/// Returns `None` if the path does not exist or is not a directory.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or a file cannot be read.
pub fn directory_hash(
    path: &Path,
    include_names: bool,
    exclude: Option<&PatternMatcher>,
) -> Result<Option<ContentHash>> {
    if !path.is_dir() {
        return Ok(None);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).min_depth(1) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            Error::io(at, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(path) else {
            continue;
        };
        if exclude.is_some_and(|m| m.is_excluded(rel, false)) {
            continue;
        }

        let rel_str = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((rel_str, entry.into_path()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (rel, file) in &files {
        if include_names {
            hasher.update((rel.len() as u64).to_le_bytes());
            hasher.update(rel.as_bytes());
        }
        stream_into(&mut hasher, file, true)?;
    }

    Ok(Some(ContentHash::from_hasher(hasher)))
}
