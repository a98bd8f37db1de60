//! Error types for the command templating crate.

use std::path::PathBuf;

/// Errors that can occur while rendering REPIC command lines.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    /// Template is neither built in nor present in the override directory.
    #[error("command template not found: {0}")]
    TemplateNotFound(String),

    /// Error occurred while rendering a template.
    #[error("command render error: {0}")]
    TemplateRenderError(String),

    /// Override directory does not exist or is not a directory.
    #[error("command template directory not found: {0}")]
    TemplateDirectoryNotFound(PathBuf),

    /// Override directory listing failed.
    #[error("failed to list command templates in {path}")]
    TemplateListError {
        /// Path to the override directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for command templating operations.
pub type Result<T> = std::result::Result<T, CommandError>;
