//! Error types for REPIC bridge operations.
//!
//! This module defines every error variant that can occur while converting
//! coordinate sets, driving the REPIC scripts and collecting the consensus.
//! All errors use `thiserror` for ergonomic error handling with context.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for REPIC bridge operations.
///
/// Each variant represents a specific failure mode with relevant context,
/// enabling precise error handling and user-friendly error messages.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RepicError {
    // Input errors
    /// Consensus needs at least two pickers.
    #[error("at least two coordinate sets are required, got {0}")]
    TooFewInputSets(usize),

    /// Coordinate sets or coordinates disagree on 2D vs 3D.
    #[error("dimensionality mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimensionality required by the set or the run.
        expected: String,
        /// Dimensionality actually encountered.
        found: String,
    },

    /// Coordinate set file could not be decoded.
    #[error("invalid coordinate set {path}: {reason}")]
    InvalidCoordinateSet {
        /// Path of the offending set file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    // Box file errors
    /// A box-file line is missing fields or holds a non-integer coordinate.
    #[error("malformed box file {path} at line {line}: {reason}")]
    MalformedBoxLine {
        /// Box file being parsed.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    // State errors
    /// State file is corrupted and cannot be parsed.
    #[error("corrupted state file: {0}")]
    CorruptedState(PathBuf),

    /// Invalid step transition attempted.
    #[error("invalid step transition from {0} to {1}")]
    InvalidStateTransition(String, String),

    /// State file is missing at the expected location.
    #[error("state file missing: {0}")]
    StateMissing(PathBuf),

    // File system errors
    /// Path not found in the file system.
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// Invalid path provided.
    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),

    /// Error reading file.
    #[error("file read error: {0}")]
    FileReadError(String),

    /// Error writing file.
    #[error("file write error: {0}")]
    FileWriteError(String),

    // Config errors
    /// Invalid configuration detected.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Error parsing configuration file.
    #[error("config parse error: {0}")]
    ConfigParseError(String),

    // External tool errors
    /// A REPIC script exited with a non-zero status.
    #[error("{program} failed with exit code {exit_code}: {stderr}")]
    ExternalToolFailed {
        /// Script name, e.g. `get_cliques.py`.
        program: String,
        /// Process exit code (-1 when killed by a signal).
        exit_code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// Shell command could not be spawned.
    #[error("shell command failed: {0}")]
    ShellCommandFailed(String),

    /// Command line could not be rendered.
    #[error(transparent)]
    Command(#[from] repic_cmd::CommandError),

    // IO and serialization errors
    /// Standard IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context from anyhow.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for REPIC bridge operations.
pub type Result<T> = std::result::Result<T, RepicError>;
