//! Context structures for command rendering.

use serde::Serialize;
use std::path::PathBuf;

/// Context for the `run_repic` template: one full shell command line.
///
/// # Examples
///
/// ```
/// use repic_cmd::{CommandEngine, CommandManager, RunRepicContext};
/// use std::path::PathBuf;
///
/// let ctx = RunRepicContext {
///     activation: "conda activate repic".to_string(),
///     python: "python".to_string(),
///     script: PathBuf::from("/opt/repic/repic/commands/run_ilp.py"),
///     args: "--num_particles 150 /out 100".to_string(),
/// };
/// let line = CommandManager::builtin().render("run_repic", &ctx).unwrap();
/// assert_eq!(
///     line,
///     "conda activate repic && python /opt/repic/repic/commands/run_ilp.py --num_particles 150 /out 100"
/// );
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RunRepicContext {
    /// Shell snippet that activates the REPIC runtime environment.
    pub activation: String,

    /// Python interpreter used to launch the script.
    pub python: String,

    /// Absolute path to the REPIC command script.
    pub script: PathBuf,

    /// Already rendered script arguments.
    pub args: String,
}

/// Arguments of the clique finding stage (`get_cliques.py`).
#[derive(Debug, Clone, Serialize)]
pub struct GetCliquesArgs {
    /// Root directory holding one box-file folder per picker.
    pub input_dir: PathBuf,

    /// Directory receiving one merged box file per image.
    pub output_dir: PathBuf,

    /// Particle box size in pixels.
    pub box_size: u32,
}

/// Arguments of the ILP optimization stage (`run_ilp.py`).
#[derive(Debug, Clone, Serialize)]
pub struct RunIlpArgs {
    /// Expected number of particles per image.
    pub num_particles: u32,

    /// Output directory of the clique finding stage.
    pub cliques_dir: PathBuf,

    /// Particle box size in pixels.
    pub box_size: u32,
}
