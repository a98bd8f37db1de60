//! Box-file bridge between coordinate sets and the REPIC scripts.
//!
//! Exports one box file per picker and image into `picker_<i>` folders, and
//! imports the consensus box file of an image back into coordinates.

use crate::boxfile::{self, box_file_name};
use crate::error::Result;
use crate::model::{Coordinate, CoordinateSet, Dimensionality};
use crate::tools::fs::FsAdapter;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the export folder for the picker at `index` (0-based).
pub fn picker_dir_name(index: usize) -> String {
    format!("picker_{index}")
}

/// Writes `<output_root>/picker_<i>/<image_key>.box` for every input set.
///
/// Each file holds the picks of that image in that picker's set, formatted
/// with the run's `box_size`. Existing folders are reused and existing files
/// are overwritten, so exporting twice yields the same files.
///
/// # Errors
///
/// Propagates folder creation and write failures from the adapter.
#[tracing::instrument(skip_all, fields(image_key = image_key))]
pub fn export_box_files(
    fs: &dyn FsAdapter,
    image_key: &str,
    sets: &[CoordinateSet],
    box_size: u32,
    output_root: &Path,
) -> Result<()> {
    for (index, set) in sets.iter().enumerate() {
        let picker_dir = output_root.join(picker_dir_name(index));
        fs.create_dir_all(&picker_dir)?;

        let positions: Vec<_> = set
            .iter_coordinates(image_key)
            .map(|coordinate| &coordinate.position)
            .collect();

        let box_path = picker_dir.join(box_file_name(image_key));
        fs.write(&box_path, &boxfile::render(positions.iter().copied(), box_size))?;

        debug!(
            picker = %set.name,
            picks = positions.len(),
            path = %box_path.display(),
            "exported box file"
        );
    }

    Ok(())
}

/// Reads the consensus box file of one image into coordinates.
///
/// A missing or zero-size file yields no coordinates. Every coordinate gets
/// no identity (the output set assigns one on append), the box size of
/// `reference`, its sampling rate for tomograms, and the image of
/// `reference` whose key matches `image_key`, if any.
///
/// # Errors
///
/// Returns `RepicError::MalformedBoxLine` if any line of the file cannot be
/// parsed, or a read error from the adapter.
#[tracing::instrument(skip_all, fields(image_key = image_key))]
pub fn import_consensus(
    fs: &dyn FsAdapter,
    image_key: &str,
    consensus_box_file: &Path,
    reference: &CoordinateSet,
) -> Result<Vec<Coordinate>> {
    if !fs.is_file(consensus_box_file) || fs.file_len(consensus_box_file)? == 0 {
        warn!(
            path = %consensus_box_file.display(),
            "no consensus picks for image"
        );
        return Ok(Vec::new());
    }

    let content = fs.read_to_string(consensus_box_file)?;
    let positions = boxfile::parse(&content, reference.dimensionality, consensus_box_file)?;

    let image = reference.find_image(image_key).cloned();
    if image.is_none() {
        warn!("image not found in reference collection; picks left unattached");
    }

    let sampling_rate = match reference.dimensionality {
        Dimensionality::Three => reference.sampling_rate,
        Dimensionality::Two => None,
    };

    let coordinates = positions
        .into_iter()
        .map(|position| Coordinate {
            sampling_rate,
            image: image.clone(),
            ..Coordinate::at(image_key, position, reference.box_size)
        })
        .collect::<Vec<_>>();

    debug!(picks = coordinates.len(), "imported consensus picks");
    Ok(coordinates)
}
