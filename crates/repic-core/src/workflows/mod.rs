//! Consensus run steps.
//!
//! - `convert`: reconcile images and export per-picker box files
//! - `cliques`: run REPIC clique finding
//! - `optimize`: run REPIC ILP optimization
//! - `output`: import the consensus box files into a coordinate set

pub mod cliques;
pub mod convert;
pub mod optimize;
pub mod output;

pub use cliques::get_cliques;
pub use convert::{convert_input, validate_inputs};
pub use optimize::optimize_cliques;
pub use output::{OUTPUT_SET_NAME, collect_consensus, create_output};
