//! # File Management Module
//!
//! Discovery of candidate images and in-place replacement of their contents.
//!
//! ## Discovery rules:
//! - a file root is processed as-is, whatever its extension
//! - a directory root is walked recursively; only files ending in `.png`,
//!   `.jpeg` or `.jpg` are kept (case-sensitive). Symlinks to files are kept,
//!   symlinked directories are not descended into
//! - anything else is a `PathNotFound` error
//!
//! ## Replacement:
//! New contents go to a temporary file next to the original, which is then
//! renamed over it. A failed write leaves the original untouched.
//!
//! Everything here is blocking; the runner calls it through the worker pool.

use crate::error::{Result, TinifyError};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Extensions picked up when walking a directory
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg"];

/// Manages file discovery and replacement
pub struct FileManager;

impl FileManager {
    /// Resolve the run root into the list of images to process
    pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
        if root.is_file() {
            Ok(vec![root.to_path_buf()])
        } else if root.is_dir() {
            Ok(Self::find_image_files(root))
        } else {
            Err(TinifyError::PathNotFound(root.to_path_buf()))
        }
    }

    /// Find all candidate images below a directory, sorted and deduplicated
    pub fn find_image_files(dir: &Path) -> Vec<PathBuf> {
        let mut files = BTreeSet::new();

        for entry in WalkDir::new(dir).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if Self::is_file_entry(&entry) && Self::is_candidate(entry.path()) {
                files.insert(entry.into_path());
            }
        }

        files.into_iter().collect()
    }

    fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
        entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
    }

    /// Check if a path has one of the image extensions (exact match)
    pub fn is_candidate(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }

    /// Atomically replace the contents of `path`, keeping its permissions.
    /// A symlink is resolved first so its target is rewritten, not the link.
    pub fn replace_contents(path: &Path, contents: &[u8]) -> Result<()> {
        let resolved;
        let path = if fs::symlink_metadata(path)?.file_type().is_symlink() {
            resolved = fs::canonicalize(path)?;
            resolved.as_path()
        } else {
            path
        };

        let permissions = fs::metadata(path)?.permissions();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".tinicly-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        temp.write_all(contents)?;
        temp.as_file().sync_all()?;
        fs::set_permissions(temp.path(), permissions)?;

        temp.persist(path).map_err(|e| TinifyError::Io(e.error))?;
        Ok(())
    }
}
