//! Coordinate data model.
//!
//! Images, particle coordinates and coordinate sets as exchanged between
//! pickers, the REPIC scripts and the consensus output. Coordinate sets are
//! stored as JSON documents.

use crate::error::{RepicError, Result};
use crate::tools::fs::FsAdapter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Stable identifier of an image across pickers.
pub type ImageKey = String;

/// Whether a coordinate set holds micrograph (2D) or tomogram (3D) picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimensionality {
    /// Micrograph picks, `(x, y)`.
    #[serde(rename = "2d")]
    Two,

    /// Tomogram picks, `(x, y, z)` in the bottom-left-corner convention.
    #[serde(rename = "3d")]
    Three,
}

impl Dimensionality {
    /// Returns the string representation used in set files and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimensionality::Two => "2d",
            Dimensionality::Three => "3d",
        }
    }

    /// Number of spatial axes.
    pub fn axes(&self) -> usize {
        match self {
            Dimensionality::Two => 2,
            Dimensionality::Three => 3,
        }
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimensionality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "2d" => Ok(Dimensionality::Two),
            "3d" => Ok(Dimensionality::Three),
            _ => Err(format!("invalid dimensionality: {}", s)),
        }
    }
}

/// A micrograph or tomogram referenced by coordinate sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Identifier assigned by the producing workflow, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Path of the image file.
    pub file_name: PathBuf,

    /// Tilt-series identifier; set for tomograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_id: Option<String>,

    /// Pixel (or voxel) size in Å.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,
}

impl Image {
    /// Creates a micrograph reference keyed by its file basename.
    pub fn micrograph(file_name: impl Into<PathBuf>) -> Self {
        Self {
            id: None,
            file_name: file_name.into(),
            ts_id: None,
            sampling_rate: None,
        }
    }

    /// Creates a tomogram reference keyed by its tilt-series identifier.
    pub fn tomogram(file_name: impl Into<PathBuf>, ts_id: impl Into<String>) -> Self {
        Self {
            id: None,
            file_name: file_name.into(),
            ts_id: Some(ts_id.into()),
            sampling_rate: None,
        }
    }

    /// Sets the sampling rate.
    pub fn with_sampling_rate(mut self, sampling_rate: f64) -> Self {
        self.sampling_rate = Some(sampling_rate);
        self
    }

    /// Key shared by the same image across pickers.
    ///
    /// Tomograms are keyed by their tilt-series identifier, micrographs by
    /// the basename of their file path.
    pub fn key(&self) -> ImageKey {
        if let Some(ts_id) = &self.ts_id {
            return ts_id.clone();
        }

        self.file_name
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.to_string_lossy().into_owned())
    }
}

/// Integer particle position inside one image.
///
/// Volumetric positions use the bottom-left-corner convention on all axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Position {
    /// Micrograph position.
    Planar {
        /// Column in pixels.
        x: i64,
        /// Row in pixels.
        y: i64,
    },

    /// Tomogram position.
    Volumetric {
        /// X in voxels.
        x: i64,
        /// Y in voxels.
        y: i64,
        /// Z (slice) in voxels.
        z: i64,
    },
}

impl Position {
    /// Dimensionality of this position.
    pub fn dimensionality(&self) -> Dimensionality {
        match self {
            Position::Planar { .. } => Dimensionality::Two,
            Position::Volumetric { .. } => Dimensionality::Three,
        }
    }

    /// Axis values in `x, y[, z]` order.
    pub fn axes(&self) -> Vec<i64> {
        match *self {
            Position::Planar { x, y } => vec![x, y],
            Position::Volumetric { x, y, z } => vec![x, y, z],
        }
    }
}

/// A single particle pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Identity inside the owning set; assigned on append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Key of the image this pick belongs to.
    pub image_key: ImageKey,

    /// Position inside the image.
    #[serde(flatten)]
    pub position: Position,

    /// Particle box size in pixels (voxels).
    pub box_size: u32,

    /// Sampling rate carried by tomogram picks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,

    /// Resolved image, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Coordinate {
    /// Creates a micrograph pick without identity.
    pub fn planar(image_key: impl Into<ImageKey>, x: i64, y: i64, box_size: u32) -> Self {
        Self::at(image_key, Position::Planar { x, y }, box_size)
    }

    /// Creates a tomogram pick (bottom-left-corner convention) without identity.
    pub fn volumetric(
        image_key: impl Into<ImageKey>,
        x: i64,
        y: i64,
        z: i64,
        box_size: u32,
    ) -> Self {
        Self::at(image_key, Position::Volumetric { x, y, z }, box_size)
    }

    /// Creates a pick at an arbitrary position without identity.
    pub fn at(image_key: impl Into<ImageKey>, position: Position, box_size: u32) -> Self {
        Self {
            id: None,
            image_key: image_key.into(),
            position,
            box_size,
            sampling_rate: None,
            image: None,
        }
    }
}

/// Ordered collection of picks over a shared image collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSet {
    /// Human readable set name, usually the picker name.
    pub name: String,

    /// 2D or 3D picks; every coordinate must match.
    pub dimensionality: Dimensionality,

    /// Particle box size in pixels (voxels).
    pub box_size: u32,

    /// Sampling rate of the picked images in Å/px.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,

    /// Images the picks refer to.
    #[serde(default)]
    pub images: Vec<Image>,

    /// Names of the sets this one was derived from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    #[serde(default)]
    coordinates: Vec<Coordinate>,

    /// Last identity handed out by `append`.
    #[serde(default)]
    last_id: u64,
}

impl CoordinateSet {
    /// Creates an empty set.
    pub fn new(name: impl Into<String>, dimensionality: Dimensionality, box_size: u32) -> Self {
        Self {
            name: name.into(),
            dimensionality,
            box_size,
            sampling_rate: None,
            images: Vec::new(),
            sources: Vec::new(),
            coordinates: Vec::new(),
            last_id: 0,
        }
    }

    /// Sets the backing image collection.
    pub fn with_images(mut self, images: Vec<Image>) -> Self {
        self.images = images;
        self
    }

    /// Sets the sampling rate.
    pub fn with_sampling_rate(mut self, sampling_rate: f64) -> Self {
        self.sampling_rate = Some(sampling_rate);
        self
    }

    /// Appends a pick, assigning a fresh identity when it has none.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::DimensionMismatch` if the pick is not of the
    /// set's dimensionality.
    pub fn append(&mut self, mut coordinate: Coordinate) -> Result<u64> {
        let found = coordinate.position.dimensionality();
        if found != self.dimensionality {
            return Err(RepicError::DimensionMismatch {
                expected: self.dimensionality.to_string(),
                found: found.to_string(),
            });
        }

        let id = match coordinate.id {
            Some(id) => {
                self.last_id = self.last_id.max(id);
                id
            }
            None => {
                self.last_id += 1;
                self.last_id
            }
        };
        coordinate.id = Some(id);
        self.coordinates.push(coordinate);

        Ok(id)
    }

    /// All picks in insertion order.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Number of picks.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Whether the set holds no picks.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Picks belonging to one image, in insertion order.
    pub fn iter_coordinates<'a>(
        &'a self,
        image_key: &'a str,
    ) -> impl Iterator<Item = &'a Coordinate> + 'a {
        self.coordinates
            .iter()
            .filter(move |coordinate| coordinate.image_key == image_key)
    }

    /// Keys of the backing image collection.
    pub fn image_keys(&self) -> BTreeSet<ImageKey> {
        self.images.iter().map(Image::key).collect()
    }

    /// First image of the collection with the given key.
    pub fn find_image(&self, image_key: &str) -> Option<&Image> {
        self.images.iter().find(|image| image.key() == image_key)
    }

    /// Records `name` as a source of this set, once.
    pub fn add_source(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.sources.contains(&name) {
            self.sources.push(name);
        }
    }

    /// Reads a set from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::InvalidCoordinateSet` if the document cannot be
    /// decoded or a pick does not match the set's dimensionality.
    pub fn load(fs: &dyn FsAdapter, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;
        let mut set: Self =
            serde_json::from_str(&content).map_err(|e| RepicError::InvalidCoordinateSet {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Some(bad) = set
            .coordinates
            .iter()
            .find(|c| c.position.dimensionality() != set.dimensionality)
        {
            return Err(RepicError::InvalidCoordinateSet {
                path: path.to_path_buf(),
                reason: format!(
                    "{} pick on image {} in a {} set",
                    bad.position.dimensionality(),
                    bad.image_key,
                    set.dimensionality
                ),
            });
        }

        let keys = set.image_keys();
        if let Some(orphan) = set
            .coordinates
            .iter()
            .find(|c| !keys.contains(&c.image_key))
        {
            return Err(RepicError::InvalidCoordinateSet {
                path: path.to_path_buf(),
                reason: format!(
                    "pick references image {} which is not in the image collection",
                    orphan.image_key
                ),
            });
        }

        // Hand-written documents may omit the counter
        set.last_id = set
            .coordinates
            .iter()
            .filter_map(|c| c.id)
            .fold(set.last_id, u64::max);

        Ok(set)
    }

    /// Writes the set as a pretty-printed JSON document.
    pub fn save(&self, fs: &dyn FsAdapter, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs.write(path, &content)
    }
}
