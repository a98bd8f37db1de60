//! Clique finding step.

use crate::config::RepicConfig;
use crate::error::Result;
use crate::repic::{Program, RepicPlugin};
use crate::tools::fs::FsAdapter;
use crate::tools::shell::ShellAdapter;

/// Runs `get_cliques.py` over the picker folders, writing one merged box
/// file per image into `config.cliques_dir`.
///
/// # Errors
///
/// Returns `RepicError::ExternalToolFailed` if the script exits non-zero.
#[tracing::instrument(skip_all)]
pub fn get_cliques(
    config: &RepicConfig,
    plugin: &RepicPlugin,
    fs: &dyn FsAdapter,
    shell: &dyn ShellAdapter,
) -> Result<()> {
    fs.create_dir_all(&config.cliques_dir)?;

    let args = plugin.get_cliques_args(
        &config.pickers_dir,
        &config.cliques_dir,
        config.consensus.box_size,
    )?;
    plugin.run(shell, Program::GetCliques, &args, Some(&config.work_dir))?;

    tracing::info!(dir = %config.cliques_dir.display(), "clique finding finished");
    Ok(())
}
