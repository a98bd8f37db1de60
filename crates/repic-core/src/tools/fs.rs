//! File system adapter trait.
//!
//! Box files, coordinate set documents and the run state all go through
//! `FsAdapter`, so workflows can run against the real disk or an in-memory
//! mock.

use crate::error::Result;
use std::path::Path;

/// File system adapter trait.
pub trait FsAdapter: Send + Sync {
    /// Reads the contents of a file as a string.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::PathNotFound` if the file doesn't exist and
    /// `RepicError::FileReadError` if reading fails.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Writes a string to a file, replacing any previous content.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::FileWriteError` if writing fails.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Lists the entry names (not full paths) of a directory.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::PathNotFound` if the directory doesn't exist or
    /// `RepicError::InvalidPath` if the path is not a directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>>;

    /// Size of a file in bytes.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::PathNotFound` if the file doesn't exist.
    fn file_len(&self, path: &Path) -> Result<u64>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Creates a directory and all missing parents; existing directories are
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::FileWriteError` if creation fails.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Checks if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Checks if a path is a file.
    fn is_file(&self, path: &Path) -> bool;
}
