//! Standard file system adapter implementation.

use crate::error::{RepicError, Result};
use crate::tools::fs::FsAdapter;
use std::io::ErrorKind;
use std::path::Path;

/// File system adapter backed by `std::fs`.
#[derive(Debug, Default)]
pub struct StdFsAdapter;

impl StdFsAdapter {
    /// Creates a new standard file system adapter.
    pub fn new() -> Self {
        Self
    }
}

fn write_error(path: &Path, e: std::io::Error) -> RepicError {
    RepicError::FileWriteError(format!("{}: {}", path.display(), e))
}

impl FsAdapter for StdFsAdapter {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RepicError::PathNotFound(path.to_path_buf())
            } else {
                RepicError::FileReadError(format!("{}: {}", path.display(), e))
            }
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            self.create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| write_error(path, e))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(RepicError::PathNotFound(path.to_path_buf()));
        }

        if !path.is_dir() {
            return Err(RepicError::InvalidPath(path.to_path_buf()));
        }

        std::fs::read_dir(path)
            .map_err(|e| RepicError::FileReadError(format!("{}: {}", path.display(), e)))?
            .map(|entry| {
                entry
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .map_err(|e| {
                        RepicError::FileReadError(format!("failed to read directory entry: {}", e))
                    })
            })
            .collect()
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        std::fs::metadata(path).map(|m| m.len()).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RepicError::PathNotFound(path.to_path_buf())
            } else {
                RepicError::FileReadError(format!("{}: {}", path.display(), e))
            }
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| write_error(path, e))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_overwrites_box_file() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = StdFsAdapter::new();
        let box_path = temp_dir.path().join("picker_0").join("mic1.box");

        adapter.write(&box_path, "10 20 64 64 1\n11 21 64 64 1\n").unwrap();
        adapter.write(&box_path, "10 20 64 64 1\n").unwrap();

        assert_eq!(adapter.read_to_string(&box_path).unwrap(), "10 20 64 64 1\n");
        assert_eq!(adapter.file_len(&box_path).unwrap(), 14);
    }

    #[test]
    fn test_read_nonexistent() {
        let adapter = StdFsAdapter::new();
        let result = adapter.read_to_string(Path::new("/nonexistent/mic1.box"));
        assert!(matches!(result, Err(RepicError::PathNotFound(_))));

        let result = adapter.file_len(Path::new("/nonexistent/mic1.box"));
        assert!(matches!(result, Err(RepicError::PathNotFound(_))));
    }

    #[test]
    fn test_create_dir_all_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = StdFsAdapter::new();
        let picker_dir = temp_dir.path().join("extra").join("pickers").join("picker_1");

        adapter.create_dir_all(&picker_dir).unwrap();
        adapter.create_dir_all(&picker_dir).unwrap();

        assert!(adapter.is_dir(&picker_dir));
        assert!(!adapter.is_file(&picker_dir));
    }

    #[test]
    fn test_list_dir() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = StdFsAdapter::new();

        adapter.write(&temp_dir.path().join("mic1.box"), "").unwrap();
        adapter.write(&temp_dir.path().join("mic2.box"), "").unwrap();

        let mut entries = adapter.list_dir(temp_dir.path()).unwrap();
        entries.sort();
        assert_eq!(entries, vec!["mic1.box", "mic2.box"]);

        let result = adapter.list_dir(&temp_dir.path().join("mic1.box"));
        assert!(matches!(result, Err(RepicError::InvalidPath(_))));
    }

    #[test]
    fn test_write_below_a_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = StdFsAdapter::new();
        let blocker = temp_dir.path().join("pickers");
        adapter.write(&blocker, "not a folder").unwrap();

        let result = adapter.write(&blocker.join("picker_0").join("mic1.box"), "");
        assert!(matches!(result, Err(RepicError::FileWriteError(_))));

        let result = adapter.create_dir_all(&blocker.join("picker_0"));
        assert!(matches!(result, Err(RepicError::FileWriteError(_))));
    }

    #[test]
    fn test_read_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = StdFsAdapter::new();

        let result = adapter.read_to_string(temp_dir.path());
        assert!(matches!(result, Err(RepicError::FileReadError(_))));
    }
}
