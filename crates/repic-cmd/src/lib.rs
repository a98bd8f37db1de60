//! REPIC command templating.
//!
//! This crate renders the shell command lines used to launch the REPIC
//! consensus scripts. Templates are minijinja sources; a built-in set ships
//! with the crate and any of them can be overridden from a directory of
//! `<name>.j2` files.
//!
//! # Example
//!
//! ```
//! use repic_cmd::{CommandEngine, CommandManager, GetCliquesArgs};
//! use std::path::PathBuf;
//!
//! let manager = CommandManager::builtin();
//! let args = GetCliquesArgs {
//!     input_dir: PathBuf::from("/run/extra/pickers"),
//!     output_dir: PathBuf::from("/run/extra/repicOutput"),
//!     box_size: 100,
//! };
//! let rendered = manager.render("get_cliques_args", &args).unwrap();
//! assert_eq!(rendered, "/run/extra/pickers /run/extra/repicOutput 100");
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod manager;

pub use context::{GetCliquesArgs, RunIlpArgs, RunRepicContext};
pub use engine::CommandEngine;
pub use error::{CommandError, Result};
pub use manager::{CommandManager, shell_quote};
