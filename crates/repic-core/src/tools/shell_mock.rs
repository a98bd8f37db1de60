//! Mock shell adapter for testing.
//!
//! Lets tests pre-program the outcome of the REPIC stages and inspect which
//! command lines were launched, with which environment and directory.

use crate::error::{RepicError, Result};
use crate::tools::shell::{CommandOutput, Environ, ShellAdapter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Full command line.
    pub cmd: String,
    /// Environment changes passed with the command.
    pub env: Environ,
    /// Working directory, if any.
    pub cwd: Option<PathBuf>,
}

/// Mock shell adapter for testing.
///
/// Outputs are looked up by exact command line first, then by substring
/// pattern in registration order, then the default output.
///
/// # Examples
///
/// ```
/// use repic_core::tools::shell_mock::MockShellAdapter;
/// use repic_core::tools::shell::{CommandOutput, Environ, ShellAdapter};
///
/// let shell = MockShellAdapter::with_success();
/// shell.set_output_containing(
///     "run_ilp.py",
///     CommandOutput {
///         exit_code: 1,
///         stdout: String::new(),
///         stderr: "solver not found".to_string(),
///     },
/// );
///
/// let output = shell
///     .run("python /opt/repic/repic/commands/run_ilp.py", &Environ::new(), None)
///     .unwrap();
/// assert_eq!(output.exit_code, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockShellAdapter {
    outputs: Arc<Mutex<HashMap<String, CommandOutput>>>,
    patterns: Arc<Mutex<Vec<(String, CommandOutput)>>>,
    history: Arc<Mutex<Vec<Invocation>>>,
    default_output: Arc<Mutex<Option<CommandOutput>>>,
}

impl MockShellAdapter {
    /// Creates a mock with no pre-programmed outputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that succeeds for every command.
    pub fn with_success() -> Self {
        let adapter = Self::new();
        adapter.set_default_output(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        });
        adapter
    }

    /// Sets the output for an exact command line.
    pub fn set_output(&self, cmd: &str, output: CommandOutput) {
        self.outputs.lock().unwrap().insert(cmd.to_string(), output);
    }

    /// Sets the output for any command line containing `pattern`.
    pub fn set_output_containing(&self, pattern: &str, output: CommandOutput) {
        self.patterns
            .lock()
            .unwrap()
            .push((pattern.to_string(), output));
    }

    /// Sets the output for commands matching nothing else.
    pub fn set_default_output(&self, output: CommandOutput) {
        *self.default_output.lock().unwrap() = Some(output);
    }

    /// Returns every invocation in order.
    pub fn get_history(&self) -> Vec<Invocation> {
        self.history.lock().unwrap().clone()
    }

    /// Number of invocations whose command line contains `pattern`.
    pub fn count_containing(&self, pattern: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|invocation| invocation.cmd.contains(pattern))
            .count()
    }

    /// Clears outputs and history.
    pub fn clear(&self) {
        self.outputs.lock().unwrap().clear();
        self.patterns.lock().unwrap().clear();
        self.history.lock().unwrap().clear();
        *self.default_output.lock().unwrap() = None;
    }
}

impl ShellAdapter for MockShellAdapter {
    fn run(&self, cmd: &str, env: &Environ, cwd: Option<&Path>) -> Result<CommandOutput> {
        self.history.lock().unwrap().push(Invocation {
            cmd: cmd.to_string(),
            env: env.clone(),
            cwd: cwd.map(Path::to_path_buf),
        });

        if let Some(output) = self.outputs.lock().unwrap().get(cmd) {
            return Ok(output.clone());
        }

        if let Some((_, output)) = self
            .patterns
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| cmd.contains(pattern.as_str()))
        {
            return Ok(output.clone());
        }

        self.default_output.lock().unwrap().clone().ok_or_else(|| {
            RepicError::ShellCommandFailed(format!("no output configured for command: {}", cmd))
        })
    }
}
