use std::collections::HashSet;

use agsync_core::SyncError;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LocalEntry {
    pub name: String,
    pub path: Utf8PathBuf,
}

/// Immediate children of `dir` with UTF-8 names, sorted by name.
pub fn read_entries(dir: &Utf8Path) -> Result<Vec<LocalEntry>, SyncError> {
    let mut entries = Vec::new();
    for walk in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let walk = walk.map_err(|e| SyncError::io(dir, e.into()))?;
        let path = match Utf8PathBuf::from_path_buf(walk.into_path()) {
            Ok(path) => path,
            Err(p) => {
                // no service entry can carry this name
                warn!("Skipping non-UTF-8 path {}", p.display());
                continue;
            }
        };
        let name = path.file_name().unwrap_or_default().to_string();
        entries.push(LocalEntry { name, path });
    }
    Ok(entries)
}

pub fn entry_names(dir: &Utf8Path) -> Result<HashSet<String>, SyncError> {
    Ok(read_entries(dir)?.into_iter().map(|e| e.name).collect())
}

/// Create or truncate `path` to an empty file.
pub fn touch(path: &Utf8Path) -> Result<(), SyncError> {
    std::fs::File::create(path)
        .map(|_| ())
        .map_err(|e| SyncError::io(path, e))
}

pub fn create_dir(path: &Utf8Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(path).map_err(|e| SyncError::io(path, e))
}

/// Directory name to nest under when `src` has no usable final component (`.`).
pub fn dir_name(src: &Utf8Path) -> Result<String, SyncError> {
    if let Some(name) = src.file_name() {
        return Ok(name.to_string());
    }
    let canonical = src
        .canonicalize_utf8()
        .map_err(|e| SyncError::io(src, e))?;
    canonical
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| SyncError::InvalidPath(format!("{src} has no directory name")))
}
