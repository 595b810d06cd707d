// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filesystem access for scenario files and the autosave slot.

use crate::error::{Result, ScenarioError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const APP_DIR: &str = "scenarist";
const AUTOSAVE_FILE: &str = "autosave.scen";

/// Default location of the autosave slot.
///
/// Lives in the per-user data directory, or in the temp directory when the
/// platform has none.
pub fn default_autosave_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR).join(AUTOSAVE_FILE),
        None => {
            log::warn!("No per-user data directory, keeping autosave in the temp directory");
            std::env::temp_dir().join(APP_DIR).join(AUTOSAVE_FILE)
        }
    }
}

/// Read a whole text file.
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ScenarioError::io("read", path, e))
}

/// Write `contents` to `path` so readers see either the old or the new file.
///
/// Data goes to a temp file next to `path` which is then persisted over it.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| ScenarioError::io("create", dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| ScenarioError::io("create", dir, e))?;
    file.write_all(contents)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| ScenarioError::io("write", path, e))?;
    file.persist(path)
        .map_err(|e| ScenarioError::io("write", path, e.error))?;
    Ok(())
}

/// Remove `path`, treating an already missing file as success.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ScenarioError::io("remove", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("story.scen");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(read_text(&path).unwrap(), "second");
        // No temp files left behind
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = read_text(&dir.path().join("missing.scen"));
        assert!(matches!(result, Err(ScenarioError::FileIo { action: "read", .. })));
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autosave.scen");
        remove_if_exists(&path).unwrap();

        std::fs::write(&path, "x").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_default_autosave_path() {
        let path = default_autosave_path();
        assert!(path.ends_with("scenarist/autosave.scen"));
    }
}
