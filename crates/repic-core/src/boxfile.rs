//! Box-file codec.
//!
//! A box file holds the picks of one image, one pick per line, with
//! single-space separated integer fields and a trailing `1`:
//!
//! ```text
//! 2D: <x> <y> <box> <box> 1
//! 3D: <x> <y> <z> <box> <box> <box> 1
//! ```
//!
//! 3D positions are written in the bottom-left-corner convention.

use crate::error::{RepicError, Result};
use crate::model::{Dimensionality, ImageKey, Position};
use std::path::Path;

/// Trailing flag written on every line.
pub const CONFIDENCE_FLAG: i64 = 1;

/// File name of the box file for `image_key`.
pub fn box_file_name(image_key: &str) -> String {
    format!("{image_key}.box")
}

/// Image key encoded in a box file name, if it has the `.box` extension.
pub fn image_key_of(file_name: &str) -> Option<ImageKey> {
    file_name
        .strip_suffix(".box")
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Formats one pick as a box-file line, without the newline.
///
/// # Examples
///
/// ```
/// use repic_core::boxfile::format_line;
/// use repic_core::model::Position;
///
/// assert_eq!(format_line(&Position::Planar { x: 10, y: 20 }, 64), "10 20 64 64 1");
/// assert_eq!(
///     format_line(&Position::Volumetric { x: 5, y: 6, z: 7 }, 32),
///     "5 6 7 32 32 32 1"
/// );
/// ```
pub fn format_line(position: &Position, box_size: u32) -> String {
    let axes = position.axes();
    let sizes = std::iter::repeat_n(i64::from(box_size), axes.len());

    axes.iter()
        .copied()
        .chain(sizes)
        .chain(std::iter::once(CONFIDENCE_FLAG))
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a whole box file, one newline-terminated line per pick.
pub fn render<'a>(positions: impl IntoIterator<Item = &'a Position>, box_size: u32) -> String {
    positions.into_iter().fold(String::new(), |mut content, position| {
        content.push_str(&format_line(position, box_size));
        content.push('\n');
        content
    })
}

/// Parses the position out of one box-file line.
///
/// Only the leading 2 (2D) or 3 (3D) fields are consumed; box dimensions and
/// any score or flag fields after them are ignored.
pub fn parse_line(line: &str, dimensionality: Dimensionality) -> std::result::Result<Position, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let axes = dimensionality.axes();

    if fields.len() < axes {
        return Err(format!(
            "expected at least {} fields for a {} pick, found {}",
            axes,
            dimensionality,
            fields.len()
        ));
    }

    let mut values = [0i64; 3];
    for (slot, field) in values.iter_mut().zip(&fields[..axes]) {
        *slot = field
            .parse()
            .map_err(|_| format!("coordinate field {:?} is not an integer", field))?;
    }

    Ok(match dimensionality {
        Dimensionality::Two => Position::Planar {
            x: values[0],
            y: values[1],
        },
        Dimensionality::Three => Position::Volumetric {
            x: values[0],
            y: values[1],
            z: values[2],
        },
    })
}

/// Parses every non-blank line of a box file.
///
/// # Errors
///
/// Returns `RepicError::MalformedBoxLine` for the first line that cannot be
/// parsed; nothing from the file is returned in that case.
pub fn parse(content: &str, dimensionality: Dimensionality, path: &Path) -> Result<Vec<Position>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_line(line, dimensionality).map_err(|reason| RepicError::MalformedBoxLine {
                path: path.to_path_buf(),
                line: index + 1,
                reason,
            })
        })
        .collect()
}
