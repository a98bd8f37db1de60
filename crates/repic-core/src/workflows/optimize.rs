//! ILP optimization step.

use crate::config::RepicConfig;
use crate::error::Result;
use crate::repic::{Program, RepicPlugin};
use crate::tools::shell::ShellAdapter;

/// Runs `run_ilp.py` on the clique finder output, leaving the final
/// consensus box files in `config.cliques_dir`.
///
/// # Errors
///
/// Returns `RepicError::ExternalToolFailed` if the script exits non-zero.
#[tracing::instrument(skip_all, fields(num_particles = config.consensus.num_particles))]
pub fn optimize_cliques(
    config: &RepicConfig,
    plugin: &RepicPlugin,
    shell: &dyn ShellAdapter,
) -> Result<()> {
    let args = plugin.run_ilp_args(
        config.consensus.num_particles,
        &config.cliques_dir,
        config.consensus.box_size,
    )?;
    plugin.run(shell, Program::RunIlp, &args, Some(&config.work_dir))?;

    tracing::info!("ILP optimization finished");
    Ok(())
}
