//! REPIC invocation.
//!
//! Composes the activation command, process environment and command lines
//! for the REPIC scripts, and runs them through a `ShellAdapter`.

use crate::config::RepicEnvConfig;
use crate::error::{RepicError, Result};
use crate::tools::shell::{CommandOutput, Environ, ShellAdapter};
use repic_cmd::{CommandEngine, CommandManager, GetCliquesArgs, RunIlpArgs, RunRepicContext};
use std::fmt;
use std::path::{Path, PathBuf};

/// REPIC scripts driven by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// Clique finding across pickers.
    GetCliques,

    /// ILP selection of the best supported cliques.
    RunIlp,
}

impl Program {
    /// Script file name under `repic/commands`.
    pub fn script(&self) -> &'static str {
        match self {
            Program::GetCliques => "get_cliques.py",
            Program::RunIlp => "run_ilp.py",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.script())
    }
}

/// Launcher for the REPIC scripts.
#[derive(Debug)]
pub struct RepicPlugin {
    env: RepicEnvConfig,
    commands: CommandManager,
}

impl RepicPlugin {
    /// Creates a launcher; command templates are overridden from
    /// `env.templates_dir` when set.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::Command` if the override directory is missing.
    pub fn new(env: RepicEnvConfig) -> Result<Self> {
        let commands = match &env.templates_dir {
            Some(dir) => CommandManager::with_overrides(dir.clone())?,
            None => CommandManager::builtin(),
        };
        Ok(Self { env, commands })
    }

    /// Shell snippet activating the REPIC environment.
    pub fn activation_cmd(&self) -> String {
        match &self.env.conda_activation {
            Some(conda) => format!("{} {}", conda.trim(), self.env.env_activation)
                .trim()
                .to_string(),
            None => self.env.env_activation.trim().to_string(),
        }
    }

    /// Environment for the scripts: `PYTHONPATH` points at the REPIC home
    /// only, dropping anything inherited.
    pub fn environ(&self) -> Environ {
        let mut environ = Environ::new();
        environ.set("PYTHONPATH", self.env.home.to_string_lossy());
        environ
    }

    /// Absolute or home-relative path of a script.
    pub fn script_path(&self, program: Program) -> PathBuf {
        self.env
            .home
            .join("repic")
            .join("commands")
            .join(program.script())
    }

    /// Arguments of `get_cliques.py`.
    pub fn get_cliques_args(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        box_size: u32,
    ) -> Result<String> {
        let args = GetCliquesArgs {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            box_size,
        };
        Ok(self.commands.render("get_cliques_args", &args)?)
    }

    /// Arguments of `run_ilp.py`.
    pub fn run_ilp_args(&self, num_particles: u32, cliques_dir: &Path, box_size: u32) -> Result<String> {
        let args = RunIlpArgs {
            num_particles,
            cliques_dir: cliques_dir.to_path_buf(),
            box_size,
        };
        Ok(self.commands.render("run_ilp_args", &args)?)
    }

    /// Full shell command line for `program` with rendered `args`.
    pub fn command_line(&self, program: Program, args: &str) -> Result<String> {
        let ctx = RunRepicContext {
            activation: self.activation_cmd(),
            python: self.env.python.clone(),
            script: self.script_path(program),
            args: args.to_string(),
        };
        Ok(self.commands.render("run_repic", &ctx)?)
    }

    /// Runs `program` to completion.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::ExternalToolFailed` on a non-zero exit and
    /// `RepicError::ShellCommandFailed` if the shell cannot be spawned.
    #[tracing::instrument(skip_all, fields(program = %program))]
    pub fn run(
        &self,
        shell: &dyn ShellAdapter,
        program: Program,
        args: &str,
        cwd: Option<&Path>,
    ) -> Result<CommandOutput> {
        let cmd = self.command_line(program, args)?;
        tracing::info!(cmd = %cmd, "launching REPIC");

        let output = shell.run(&cmd, &self.environ(), cwd)?;
        for line in output.stdout.lines() {
            tracing::debug!("{}", line);
        }

        if !output.success() {
            return Err(RepicError::ExternalToolFailed {
                program: program.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }
}
