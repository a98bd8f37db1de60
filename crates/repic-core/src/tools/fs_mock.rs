//! In-memory file system adapter for tests.

use crate::error::{RepicError, Result};
use crate::tools::fs::FsAdapter;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock file system adapter backed by in-memory maps.
///
/// Clones share the same storage, so a test can hand one clone to a
/// workflow and inspect the written box files through another.
///
/// # Examples
///
/// ```
/// use repic_core::tools::fs_mock::MockFsAdapter;
/// use repic_core::tools::fs::FsAdapter;
/// use std::path::Path;
///
/// let fs = MockFsAdapter::new();
/// fs.write(Path::new("/extra/picker_0/mic1.box"), "10 20 64 64 1\n").unwrap();
/// assert!(fs.is_dir(Path::new("/extra/picker_0")));
/// assert_eq!(fs.file_len(Path::new("/extra/picker_0/mic1.box")).unwrap(), 14);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFsAdapter {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl MockFsAdapter {
    /// Creates an empty mock file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock file system pre-populated with files.
    pub fn with_files(files: HashMap<PathBuf, String>) -> Self {
        let fs = Self::new();
        for (path, content) in files {
            // Writes to the mock never fail
            let _ = fs.write(&path, &content);
        }
        fs
    }

    /// Returns a copy of all files (path -> content).
    pub fn get_all_files(&self) -> HashMap<PathBuf, String> {
        self.files.lock().unwrap().clone()
    }

    /// Returns all directory paths.
    pub fn get_all_dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().unwrap().iter().cloned().collect()
    }

    fn add_dir_chain(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor == Path::new("/") {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl FsAdapter for MockFsAdapter {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| RepicError::PathNotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::add_dir_chain(&mut self.dirs.lock().unwrap(), parent);
        }

        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        let files = self.files.lock().unwrap();
        let dirs = self.dirs.lock().unwrap();

        if !dirs.contains(path) {
            if files.contains_key(path) {
                return Err(RepicError::InvalidPath(path.to_path_buf()));
            }
            return Err(RepicError::PathNotFound(path.to_path_buf()));
        }

        let children = files
            .keys()
            .chain(dirs.iter())
            .filter(|child| child.parent() == Some(path))
            .filter_map(|child| child.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect::<BTreeSet<_>>();

        Ok(children.into_iter().collect())
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|content| content.len() as u64)
            .ok_or_else(|| RepicError::PathNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path) || self.dirs.lock().unwrap().contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Self::add_dir_chain(&mut self.dirs.lock().unwrap(), path);
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}
