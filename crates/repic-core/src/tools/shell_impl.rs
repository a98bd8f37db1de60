//! Standard shell adapter implementation.

use crate::error::{RepicError, Result};
use crate::tools::shell::{CommandOutput, Environ, ShellAdapter};
use std::path::Path;
use std::process::Command;

/// Shell adapter using `std::process::Command`.
#[derive(Debug, Default)]
pub struct StdShellAdapter;

impl StdShellAdapter {
    /// Creates a new standard shell adapter.
    pub fn new() -> Self {
        Self
    }

    fn execute_command(
        &self,
        cmd: &str,
        env: &Environ,
        cwd: Option<&Path>,
    ) -> Result<CommandOutput> {
        // REPIC activation commands rely on `&&` chaining, so go through the shell
        #[cfg(unix)]
        let (shell, shell_arg) = ("sh", "-c");
        #[cfg(windows)]
        let (shell, shell_arg) = ("cmd", "/C");

        let mut command = Command::new(shell);
        command.arg(shell_arg).arg(cmd);

        for key in env.removed() {
            command.env_remove(key);
        }
        command.envs(env.vars());

        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!(cmd, cwd = ?cwd, "spawning shell command");

        let output = command.output().map_err(|e| {
            RepicError::ShellCommandFailed(format!("failed to execute command: {}", e))
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl ShellAdapter for StdShellAdapter {
    fn run(&self, cmd: &str, env: &Environ, cwd: Option<&Path>) -> Result<CommandOutput> {
        self.execute_command(cmd, env, cwd)
    }
}
