//! Tool adapters and registry.
//!
//! The bridge touches the outside world through two adapters: the file
//! system (box files, set documents, run state) and the shell (the REPIC
//! scripts). Each adapter trait has a `std` implementation and an in-memory
//! mock for tests.

pub mod fs;
pub mod fs_impl;
pub mod fs_mock;
pub mod shell;
pub mod shell_impl;
pub mod shell_mock;

/// Tool registry that owns the adapters used by a consensus run.
///
/// Adapters are trait objects so that real and mock implementations can be
/// swapped without touching the workflows.
pub struct ToolRegistry {
    /// File system adapter for box files, set documents and run state.
    pub fs: Box<dyn fs::FsAdapter>,

    /// Shell adapter for launching the REPIC scripts.
    pub shell: Box<dyn shell::ShellAdapter>,
}

impl ToolRegistry {
    /// Creates a new tool registry with the provided adapters.
    pub fn new(fs: Box<dyn fs::FsAdapter>, shell: Box<dyn shell::ShellAdapter>) -> Self {
        Self { fs, shell }
    }

    /// Creates a registry backed by `std::fs` and `std::process`.
    pub fn standard() -> Self {
        Self::new(
            Box::new(fs_impl::StdFsAdapter::new()),
            Box::new(shell_impl::StdShellAdapter::new()),
        )
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("fs", &"Box<dyn FsAdapter>")
            .field("shell", &"Box<dyn ShellAdapter>")
            .finish()
    }
}
