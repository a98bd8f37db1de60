//! Runtime for consensus runs.
//!
//! `ConsensusRuntime` owns the configuration, the tool adapters, the REPIC
//! plugin and the persisted run state, and drives the four steps of a run
//! in order. Progress is saved after every step so that an interrupted run
//! can be resumed from its work directory.

use crate::config::RepicConfig;
use crate::error::{RepicError, Result};
use crate::model::CoordinateSet;
use crate::repic::RepicPlugin;
use crate::state::{RunState, Step};
use crate::tools::ToolRegistry;
use crate::tools::fs::FsAdapter;
use crate::workflows;
use std::path::PathBuf;

/// Runtime trait for consensus run execution.
pub trait Runtime {
    /// Runs a single step. It must be the next pending step of the run.
    fn run_step(&mut self, step: Step) -> Result<()>;

    /// Runs every pending step in order.
    fn run(&mut self) -> Result<()>;

    /// Human readable summary of the run so far.
    fn summary(&self) -> Vec<String>;
}

/// Runtime for a REPIC consensus run in one work directory.
///
/// # Examples
///
/// ```no_run
/// use repic_core::{ConsensusRuntime, RepicConfig, Runtime};
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RepicConfig::load(PathBuf::from("/data/run1"))?;
/// let mut runtime = ConsensusRuntime::new(
///     config,
///     vec![PathBuf::from("cryolo.json"), PathBuf::from("topaz.json")],
/// )?;
/// runtime.run()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConsensusRuntime {
    /// Run configuration.
    pub config: RepicConfig,

    /// Tool registry for file system and shell operations.
    pub tools: ToolRegistry,

    /// REPIC invocation settings.
    pub plugin: RepicPlugin,

    /// Persisted progress of the run.
    pub state: RunState,

    inputs: Vec<CoordinateSet>,
}

impl ConsensusRuntime {
    /// Creates a runtime over the picker sets at `input_paths`, backed by the
    /// standard adapters.
    ///
    /// # Errors
    ///
    /// See [`ConsensusRuntime::with_tools`].
    pub fn new(config: RepicConfig, input_paths: Vec<PathBuf>) -> Result<Self> {
        Self::with_tools(config, ToolRegistry::standard(), input_paths)
    }

    /// Creates a runtime with the given adapters.
    ///
    /// If the work directory already holds a run state, that run is picked
    /// up again; `input_paths` must then be empty or equal to the recorded
    /// inputs, and the consensus parameters must match the recorded ones.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::InvalidConfig` for invalid parameters or a
    /// conflict with the recorded run, `RepicError::CorruptedState` for an
    /// unreadable state file and `RepicError::InvalidCoordinateSet` for an
    /// unreadable input set.
    pub fn with_tools(
        config: RepicConfig,
        tools: ToolRegistry,
        input_paths: Vec<PathBuf>,
    ) -> Result<Self> {
        Self::open(config, tools, Some(input_paths))
    }

    /// Resumes the run recorded in the work directory.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::StateMissing` if no run was started there.
    pub fn resume(config: RepicConfig) -> Result<Self> {
        Self::resume_with_tools(config, ToolRegistry::standard())
    }

    /// Resumes the recorded run with the given adapters.
    ///
    /// The box size and particle count recorded when the run started replace
    /// those of `config`.
    pub fn resume_with_tools(config: RepicConfig, tools: ToolRegistry) -> Result<Self> {
        if !tools.fs.exists(&config.state_file) {
            return Err(RepicError::StateMissing(config.state_file.clone()));
        }
        Self::open(config, tools, None)
    }

    fn open(
        mut config: RepicConfig,
        tools: ToolRegistry,
        input_paths: Option<Vec<PathBuf>>,
    ) -> Result<Self> {
        config.validate()?;

        let state = if tools.fs.exists(&config.state_file) {
            let state = RunState::load(&*tools.fs, &config.state_file)?;
            match input_paths {
                Some(paths) => check_same_run(&config, &state, &paths)?,
                None => config.consensus = state.consensus,
            }
            tracing::info!(
                completed = state.completed.len(),
                box_size = state.consensus.box_size,
                "picked up existing run state"
            );
            state
        } else {
            RunState::new(input_paths.unwrap_or_default(), config.consensus)
        };

        let plugin = RepicPlugin::new(config.repic.clone())?;
        let inputs = load_inputs(&*tools.fs, &state.inputs)?;

        Ok(Self {
            config,
            tools,
            plugin,
            state,
            inputs,
        })
    }

    /// Input picker sets, in picker order.
    pub fn inputs(&self) -> &[CoordinateSet] {
        &self.inputs
    }

    fn save_state(&mut self) -> Result<()> {
        self.state.save(&*self.tools.fs, &self.config.state_file)
    }
}

impl Runtime for ConsensusRuntime {
    #[tracing::instrument(skip(self), fields(work_dir = %self.config.work_dir.display()))]
    fn run_step(&mut self, step: Step) -> Result<()> {
        if self.state.next_step() != Some(step) {
            let from = self
                .state
                .completed
                .last()
                .map_or("start".to_string(), Step::to_string);
            return Err(RepicError::InvalidStateTransition(from, step.to_string()));
        }

        tracing::info!("running step");
        let fs = &*self.tools.fs;
        let shell = &*self.tools.shell;

        match step {
            Step::ConvertInput => {
                self.state.common_images =
                    workflows::convert_input(&self.config, &self.inputs, fs)?;
            }
            Step::GetCliques => {
                workflows::get_cliques(&self.config, &self.plugin, fs, shell)?;
            }
            Step::OptimizeCliques => {
                workflows::optimize_cliques(&self.config, &self.plugin, shell)?;
            }
            Step::CreateOutput => {
                let output = workflows::create_output(&self.config, &self.inputs, fs)?;
                self.state.picked_particles = output.len();
            }
        }

        self.state.complete(step)?;
        self.save_state()
    }

    fn run(&mut self) -> Result<()> {
        if self.state.is_finished() {
            tracing::info!("run already finished");
            return Ok(());
        }

        self.save_state()?;
        while let Some(step) = self.state.next_step() {
            self.run_step(step)?;
        }

        for line in self.summary() {
            tracing::info!("{}", line);
        }
        Ok(())
    }

    fn summary(&self) -> Vec<String> {
        self.state.summary()
    }
}

fn check_same_run(config: &RepicConfig, state: &RunState, input_paths: &[PathBuf]) -> Result<()> {
    if !input_paths.is_empty() && state.inputs != input_paths {
        return Err(RepicError::InvalidConfig(format!(
            "{} already holds a run over different inputs",
            config.work_dir.display()
        )));
    }

    if state.consensus != config.consensus {
        return Err(RepicError::InvalidConfig(format!(
            "{} already holds a run with box_size {} and num_particles {}; resume it instead",
            config.work_dir.display(),
            state.consensus.box_size,
            state.consensus.num_particles
        )));
    }

    Ok(())
}

fn load_inputs(fs: &dyn FsAdapter, paths: &[PathBuf]) -> Result<Vec<CoordinateSet>> {
    paths
        .iter()
        .map(|path| CoordinateSet::load(fs, path))
        .collect()
}
