//! Input conversion step.

use crate::bridge::export_box_files;
use crate::config::RepicConfig;
use crate::error::{RepicError, Result};
use crate::model::{CoordinateSet, Dimensionality};
use crate::reconcile::reconcile_images;
use crate::tools::fs::FsAdapter;
use anyhow::Context;

/// Checks that the inputs can be reconciled and returns their dimensionality.
///
/// # Errors
///
/// Returns `RepicError::TooFewInputSets` for fewer than two sets and
/// `RepicError::DimensionMismatch` if 2D and 3D sets are mixed.
pub fn validate_inputs(inputs: &[CoordinateSet]) -> Result<Dimensionality> {
    let [first, rest @ ..] = inputs else {
        return Err(RepicError::TooFewInputSets(0));
    };
    if rest.is_empty() {
        return Err(RepicError::TooFewInputSets(1));
    }

    if let Some(other) = rest
        .iter()
        .find(|set| set.dimensionality != first.dimensionality)
    {
        return Err(RepicError::DimensionMismatch {
            expected: first.dimensionality.to_string(),
            found: format!("{} in set {}", other.dimensionality, other.name),
        });
    }

    Ok(first.dimensionality)
}

/// Reconciles the input images and exports one box file per picker for
/// every shared image under `config.pickers_dir`.
///
/// Returns the number of shared images; zero is a valid, empty run.
///
/// # Errors
///
/// Returns validation errors from [`validate_inputs`] and write failures.
#[tracing::instrument(skip_all, fields(pickers = inputs.len()))]
pub fn convert_input(
    config: &RepicConfig,
    inputs: &[CoordinateSet],
    fs: &dyn FsAdapter,
) -> Result<usize> {
    let dimensionality = validate_inputs(inputs)?;
    let images = reconcile_images(inputs);

    if images.is_empty() {
        tracing::warn!("no image is shared by every picker");
    }

    fs.create_dir_all(&config.pickers_dir)?;
    for image_key in images.keys() {
        export_box_files(
            fs,
            image_key,
            inputs,
            config.consensus.box_size,
            &config.pickers_dir,
        )
        .with_context(|| format!("failed to export box files for {}", image_key))?;
    }

    tracing::info!(
        images = images.len(),
        dimensionality = %dimensionality,
        dir = %config.pickers_dir.display(),
        "exported picker box files"
    );

    Ok(images.len())
}
