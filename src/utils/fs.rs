//! Output-tree filesystem helpers.
//!
//! Listing is pure (returns paths); copy/clean helpers carry the side effects.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// List all regular files under `root`, recursively, in sorted order.
///
/// Returns an empty list when `root` does not exist. Sorting keeps every
/// pipeline pass deterministic across platforms.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = jwalk::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

/// List files under `root` with one of the given lowercase extensions.
pub fn list_files_with_ext(root: &Path, exts: &[&str]) -> Vec<PathBuf> {
    list_files(root)
        .into_iter()
        .filter(|p| exts.contains(&super::path::extension(p).as_str()))
        .collect()
}

/// List regular files directly inside `root` (non-recursive), sorted.
pub fn list_top_level(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

/// Copy `source` into `dest_dir` keeping only the basename (flatten).
///
/// Creates `dest_dir` if needed. Returns the destination path.
pub fn flatten_copy(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .with_context(|| format!("path has no file name: {}", source.display()))?;
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("failed to create {}", dest_dir.display()))?;

    let dest = dest_dir.join(name);
    fs::copy(source, &dest)
        .with_context(|| format!("failed to copy {} -> {}", source.display(), dest.display()))?;
    Ok(dest)
}

/// Write text to a path, creating parent directories as needed.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Remove a directory tree if it exists.
pub fn clean_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to remove {}", dir.display()))?;
    }
    Ok(())
}
