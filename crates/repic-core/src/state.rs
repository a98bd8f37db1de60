//! Run state for consensus runs.
//!
//! A run moves through four steps in a fixed order. Completed steps, the
//! input set documents and the resulting counts are persisted to
//! `state.toml` so that an interrupted run can resume after the last
//! completed step.

use crate::config::ConsensusParams;
use crate::error::{RepicError, Result};
use crate::tools::fs::FsAdapter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Steps of a consensus run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Reconcile images and export per-picker box files.
    ConvertInput,

    /// Run REPIC clique finding.
    GetCliques,

    /// Run REPIC ILP optimization.
    OptimizeCliques,

    /// Import consensus box files into the output set.
    CreateOutput,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Step; 4] = [
        Step::ConvertInput,
        Step::GetCliques,
        Step::OptimizeCliques,
        Step::CreateOutput,
    ];

    /// Returns the string representation of the step.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ConvertInput => "convert_input",
            Step::GetCliques => "get_cliques",
            Step::OptimizeCliques => "optimize_cliques",
            Step::CreateOutput => "create_output",
        }
    }

    /// Step following this one, if any.
    pub fn next(&self) -> Option<Step> {
        match self {
            Step::ConvertInput => Some(Step::GetCliques),
            Step::GetCliques => Some(Step::OptimizeCliques),
            Step::OptimizeCliques => Some(Step::CreateOutput),
            Step::CreateOutput => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("invalid step: {}", s))
    }
}

/// Persisted progress of one consensus run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Coordinate set documents, in picker order.
    pub inputs: Vec<PathBuf>,

    /// Steps finished so far, in order.
    #[serde(default)]
    pub completed: Vec<Step>,

    /// Images shared by every picker (set by `convert_input`).
    #[serde(default)]
    pub common_images: usize,

    /// Consensus picks written (set by `create_output`).
    #[serde(default)]
    pub picked_particles: usize,

    /// RFC 3339 creation time.
    pub created_at: String,

    /// RFC 3339 time of the last save.
    pub updated_at: String,

    /// Box size and particle count fixed when the run started.
    #[serde(default)]
    pub consensus: ConsensusParams,
}

impl RunState {
    /// Creates the state of a fresh run over `inputs` with `consensus`
    /// parameters.
    pub fn new(inputs: Vec<PathBuf>, consensus: ConsensusParams) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            inputs,
            completed: Vec::new(),
            common_images: 0,
            picked_particles: 0,
            created_at: now.clone(),
            updated_at: now,
            consensus,
        }
    }

    /// Whether `step` has already run.
    pub fn is_completed(&self, step: Step) -> bool {
        self.completed.contains(&step)
    }

    /// First step that has not run yet.
    pub fn next_step(&self) -> Option<Step> {
        match self.completed.last() {
            None => Some(Step::ConvertInput),
            Some(last) => last.next(),
        }
    }

    /// Whether every step has run.
    pub fn is_finished(&self) -> bool {
        self.next_step().is_none()
    }

    /// Marks `step` as completed.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::InvalidStateTransition` unless `step` is the
    /// next step of the run.
    pub fn complete(&mut self, step: Step) -> Result<()> {
        if self.next_step() != Some(step) {
            let from = self
                .completed
                .last()
                .map_or("start".to_string(), Step::to_string);
            return Err(RepicError::InvalidStateTransition(from, step.to_string()));
        }

        self.completed.push(step);
        Ok(())
    }

    /// Human readable run summary.
    pub fn summary(&self) -> Vec<String> {
        let mut summary = vec![format!(
            "{} input sets, {} shared images.",
            self.inputs.len(),
            self.common_images
        )];

        if self.is_finished() {
            summary.push(format!(
                "REPIC protocol has found {} particles.",
                self.picked_particles
            ));
        } else if let Some(step) = self.next_step() {
            summary.push(format!("Run pending at step {}.", step));
        }

        summary
    }

    /// Reads the state file.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::StateMissing` if the file does not exist and
    /// `RepicError::CorruptedState` if it cannot be decoded.
    pub fn load(fs: &dyn FsAdapter, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            return Err(RepicError::StateMissing(path.to_path_buf()));
        }

        let content = fs.read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to decode run state");
            RepicError::CorruptedState(path.to_path_buf())
        })
    }

    /// Stamps `updated_at` and writes the state file.
    pub fn save(&mut self, fs: &dyn FsAdapter, path: &Path) -> Result<()> {
        self.updated_at = chrono::Utc::now().to_rfc3339();
        let content = toml::to_string(self)
            .map_err(|e| RepicError::FileWriteError(format!("{}: {}", path.display(), e)))?;
        fs.write(path, &content)
    }
}
