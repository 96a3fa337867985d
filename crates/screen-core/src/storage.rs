//! Read/write the screen index file.
//!
//! Writes go to a sibling `.tmp` file that is renamed over the target, so a
//! crash mid-write never leaves a truncated index behind.

use crate::error::StoreError;
use crate::index::{FORMAT_VERSION, ScreenIndex};
use std::fs;
use std::path::{Path, PathBuf};

const INDEX_DIR: &str = "data";
const INDEX_FILE: &str = "screen-index.json";

/// Default location of the index file for a given root directory.
pub fn default_index_path(root: &Path) -> PathBuf {
    root.join(INDEX_DIR).join(INDEX_FILE)
}

/// Check if an index file exists at `path`.
pub fn index_exists(path: &Path) -> bool {
    path.is_file()
}

/// Path of the backup written by [`save_with_backup`].
pub fn backup_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "bak")
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Load the index from disk.
pub fn load(path: &Path) -> Result<ScreenIndex, StoreError> {
    if !path.exists() {
        return Err(StoreError::Missing {
            path: path.to_path_buf(),
        });
    }
    let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let mut index: ScreenIndex =
        serde_json::from_str(&json).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if index.format_version != FORMAT_VERSION {
        tracing::debug!(
            "index {} has format {}, reading as {}",
            path.display(),
            index.format_version,
            FORMAT_VERSION
        );
        index.format_version = FORMAT_VERSION.to_string();
    }
    // Files from older writers can carry stale or repeated keywords.
    for screen in index
        .projects
        .values_mut()
        .flat_map(|p| p.versions.values_mut())
        .flat_map(|v| v.screens.iter_mut())
    {
        screen.refresh_keywords();
    }
    index.recount();
    Ok(index)
}

/// Save the index atomically, creating the parent directory if needed.
pub fn save(path: &Path, index: &ScreenIndex) -> Result<(), StoreError> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            action: "create directory",
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(index).map_err(StoreError::Serialize)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|source| StoreError::Io {
        action: "write",
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        action: "replace",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Copy the current file to `<path>.bak` (if there is one), then [`save`].
///
/// Returns the backup path when a backup was written.
pub fn save_with_backup(path: &Path, index: &ScreenIndex) -> Result<Option<PathBuf>, StoreError> {
    let backup = if path.is_file() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|source| StoreError::Io {
            action: "back up",
            path: backup.clone(),
            source,
        })?;
        Some(backup)
    } else {
        None
    };
    save(path, index)?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/tmp/data/screen-index.json");
        assert_eq!(
            backup_path(path),
            PathBuf::from("/tmp/data/screen-index.json.bak")
        );
        assert_eq!(
            temp_path(path),
            PathBuf::from("/tmp/data/screen-index.json.tmp")
        );
    }

    #[test]
    fn test_default_index_path() {
        assert_eq!(
            default_index_path(Path::new("/srv")),
            PathBuf::from("/srv/data/screen-index.json")
        );
    }
}
