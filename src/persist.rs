//! Whole-document JSON persistence.
//!
//! Documents are replaced, never edited: a write lands in a sibling temp
//! file, is synced, then renamed over the target. Readers see either the
//! old document or the new one.

use crate::error::{Result, TrackerError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read a JSON document. Returns `None` if the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(unavailable(path, e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| TrackerError::StorageUnavailable(format!("{}: {}", path.display(), e)))
}

/// Atomically replace `path` with the pretty-printed JSON of `value`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path(path);

    let written = (|| -> io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(unavailable(path, e));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn unavailable(path: &Path, e: io::Error) -> TrackerError {
    TrackerError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let value: Option<Vec<u32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_replaces_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &vec![1, 2, 3]).unwrap();
        write_json(&path, &vec![4]).unwrap();

        let value: Option<Vec<u32>> = read_json(&path).unwrap();
        assert_eq!(value, Some(vec![4]));
        assert!(!dir.path().join("doc.json.tmp").exists());
    }

    #[test]
    fn test_garbage_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, b"{not json").unwrap();

        let result: Result<Option<Vec<u32>>> = read_json(&path);
        assert!(matches!(result, Err(TrackerError::StorageUnavailable(_))));
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("doc.json");

        let result = write_json(&path, &vec![1]);
        assert!(matches!(result, Err(TrackerError::StorageUnavailable(_))));
    }
}
