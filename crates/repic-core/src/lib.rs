//! REPIC Core - consensus particle picking bridge.
//!
//! This crate reconciles the images shared by several particle pickers,
//! exports their picks as box files for REPIC, drives the REPIC scripts and
//! imports the consensus box files back into a coordinate set.
//!
//! # Architecture
//!
//! - [`model`]: images, positions, coordinates and coordinate sets
//! - [`boxfile`]: the plain-text box file codec
//! - [`reconcile`]: shared image computation across picker sets
//! - [`bridge`]: box file export and consensus import
//! - [`repic`]: REPIC environment and script invocation
//! - [`workflows`]: the four steps of a consensus run
//! - [`runtime`]: step sequencing with persisted [`state`]
//! - [`config`]: work directory layout and `repic.toml`
//! - [`tools`]: file system and shell adapters
//!
//! # Example
//!
//! ```rust
//! use repic_core::{Coordinate, CoordinateSet, Dimensionality, Image};
//! use repic_core::reconcile::reconcile_images;
//!
//! let mut cryolo = CoordinateSet::new("cryolo", Dimensionality::Two, 64)
//!     .with_images(vec![Image::micrograph("/mics/mic1.mrc")]);
//! cryolo.append(Coordinate::planar("mic1.mrc", 10, 20, 64)).unwrap();
//!
//! let topaz = CoordinateSet::new("topaz", Dimensionality::Two, 64)
//!     .with_images(vec![Image::micrograph("/mics/mic1.mrc")]);
//!
//! let shared = reconcile_images(&[cryolo, topaz]);
//! assert!(shared.contains_key("mic1.mrc"));
//! ```

pub mod boxfile;
pub mod bridge;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod repic;
pub mod runtime;
pub mod state;
pub mod tools;
pub mod workflows;

// Re-export core types for convenience
pub use config::{ConsensusParams, RepicConfig, RepicEnvConfig};
pub use error::{RepicError, Result};
pub use model::{Coordinate, CoordinateSet, Dimensionality, Image, ImageKey, Position};
pub use runtime::{ConsensusRuntime, Runtime};
pub use state::{RunState, Step};
pub use tools::ToolRegistry;
