//! Shell adapter trait and process environment.
//!
//! This module defines the `ShellAdapter` trait used to launch the REPIC
//! scripts, together with `Environ`, the set of environment changes applied
//! to the launched process.

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Shell command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code from the command (0 typically indicates success).
    pub exit_code: i32,

    /// Standard output from the command.
    pub stdout: String,

    /// Standard error output from the command.
    pub stderr: String,
}

impl CommandOutput {
    /// Checks if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Environment changes applied on top of the inherited process environment.
///
/// A variable is either set to a value or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ {
    changes: BTreeMap<String, Option<String>>,
}

impl Environ {
    /// Creates an environment that inherits everything unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value` in the launched process.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.changes.insert(key.into(), Some(value.into()));
        self
    }

    /// Removes `key` from the launched process.
    pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
        self.changes.insert(key.into(), None);
        self
    }

    /// Value `key` will have, or `None` when it is removed or inherited.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.changes.get(key).and_then(|value| value.as_deref())
    }

    /// Whether `key` is removed from the launched process.
    pub fn is_removed(&self, key: &str) -> bool {
        matches!(self.changes.get(key), Some(None))
    }

    /// Variables to set, in key order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changes
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }

    /// Variables to remove, in key order.
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key.as_str())
    }
}

/// Shell adapter trait.
///
/// Implementations can execute real commands or provide mocked behavior for
/// testing.
pub trait ShellAdapter: Send + Sync {
    /// Executes a shell command and waits for completion, capturing output.
    ///
    /// # Arguments
    ///
    /// * `cmd` - Command line to execute.
    /// * `env` - Environment changes for the process.
    /// * `cwd` - Working directory for the command (optional).
    ///
    /// # Errors
    ///
    /// Returns `RepicError::ShellCommandFailed` if the command cannot be
    /// spawned. A non-zero exit code is not an error at this level; check
    /// `CommandOutput::success()`.
    fn run(&self, cmd: &str, env: &Environ, cwd: Option<&Path>) -> Result<CommandOutput>;
}
