//! Recursive vault directory walker.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use thiserror::Error;
use walkdir::WalkDir;

use crate::host::Fingerprint;

#[derive(Debug, Error)]
pub enum VaultWalkerError {
    #[error("vault root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to walk vault directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),

    #[error("failed to read file metadata {0}: {1}")]
    MetadataError(String, #[source] std::io::Error),
}

/// Information about a discovered markdown file.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Absolute path to the file.
    pub absolute_path: PathBuf,
    /// Path relative to vault root, always `/`-separated.
    pub relative_path: String,
    /// File creation time (falls back to modification time where the
    /// platform does not record it).
    pub created: SystemTime,
    /// File modification time.
    pub modified: SystemTime,
    /// File size in bytes.
    pub size: u64,
}

impl WalkedFile {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(millis(self.created), millis(self.modified), self.size)
    }
}

fn millis(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

/// Walker for discovering markdown files in a vault.
#[derive(Debug)]
pub struct VaultWalker {
    root: PathBuf,
}

impl VaultWalker {
    /// Create a new walker for the given vault root.
    pub fn new(root: &Path) -> Result<Self, VaultWalkerError> {
        let root = root
            .canonicalize()
            .map_err(|_| VaultWalkerError::MissingRoot(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(VaultWalkerError::MissingRoot(root.display().to_string()));
        }

        Ok(Self { root })
    }

    /// Walk the vault and return all markdown files sorted by relative path.
    /// Hidden entries and common non-vault directories are skipped. Folder
    /// exclusion rules are not applied here: excluded notes still exist and
    /// can still be linked to.
    pub fn walk(&self) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_skipped(e))
        {
            let entry = entry.map_err(|e| {
                VaultWalkerError::WalkError(self.root.display().to_string(), e)
            })?;

            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let metadata = path.metadata().map_err(|e| {
                VaultWalkerError::MetadataError(path.display().to_string(), e)
            })?;

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let relative_path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let modified = metadata.modified().unwrap_or(std::time::UNIX_EPOCH);
            files.push(WalkedFile {
                absolute_path: path.to_path_buf(),
                relative_path,
                created: metadata.created().unwrap_or(modified),
                modified,
                size: metadata.len(),
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// Get the vault root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    // Never filter the root directory (depth 0)
    if entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }

    matches!(name.as_ref(), "node_modules" | "target" | "__pycache__" | "venv")
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "md")
}
