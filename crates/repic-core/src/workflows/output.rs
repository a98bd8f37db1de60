//! Output creation step.

use crate::bridge::import_consensus;
use crate::boxfile::box_file_name;
use crate::config::RepicConfig;
use crate::error::{RepicError, Result};
use crate::model::{CoordinateSet, ImageKey};
use crate::reconcile::reconcile_images;
use crate::tools::fs::FsAdapter;
use anyhow::Context;
use std::path::Path;

/// Name of the consensus coordinate set.
pub const OUTPUT_SET_NAME: &str = "consensus";

/// Imports the consensus box file of every shared image into a new
/// coordinate set and saves it to `config.output_file`.
///
/// The shared image set is recomputed from `inputs`. The output set takes
/// its box size, sampling rate and images from the first input and lists
/// every input as a source. Images without a consensus file contribute no
/// picks.
///
/// # Errors
///
/// Returns `RepicError::MalformedBoxLine` for an unparsable consensus file
/// and write failures for the output document.
#[tracing::instrument(skip_all, fields(pickers = inputs.len()))]
pub fn create_output(
    config: &RepicConfig,
    inputs: &[CoordinateSet],
    fs: &dyn FsAdapter,
) -> Result<CoordinateSet> {
    let reference = inputs.first().ok_or(RepicError::TooFewInputSets(0))?;
    let images = reconcile_images(inputs);

    let mut output = collect_consensus(fs, &config.cliques_dir, images.keys(), reference)?;
    for input in inputs {
        output.add_source(input.name.clone());
    }

    output
        .save(fs, &config.output_file)
        .with_context(|| format!("failed to save {}", config.output_file.display()))?;

    tracing::info!(
        images = images.len(),
        picks = output.len(),
        path = %config.output_file.display(),
        "created consensus coordinate set"
    );

    Ok(output)
}

/// Imports `<box_dir>/<key>.box` for each of `image_keys` into a new
/// consensus set carrying the metadata of `reference`.
///
/// The returned set lists no sources; callers record the pickers that fed
/// the consensus.
///
/// # Errors
///
/// Returns `RepicError::MalformedBoxLine` for an unparsable box file.
pub fn collect_consensus<'a>(
    fs: &dyn FsAdapter,
    box_dir: &Path,
    image_keys: impl IntoIterator<Item = &'a ImageKey>,
    reference: &CoordinateSet,
) -> Result<CoordinateSet> {
    let mut output = CoordinateSet::new(
        OUTPUT_SET_NAME,
        reference.dimensionality,
        reference.box_size,
    )
    .with_images(reference.images.clone());
    output.sampling_rate = reference.sampling_rate;

    for image_key in image_keys {
        let path = box_dir.join(box_file_name(image_key));
        for coordinate in import_consensus(fs, image_key, &path, reference)? {
            output.append(coordinate)?;
        }
    }

    Ok(output)
}
