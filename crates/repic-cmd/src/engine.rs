//! Core command engine trait definition.

use crate::error::Result;
use serde::Serialize;

/// Trait for rendering command templates with dynamic context.
///
/// Implementations handle template lookup and rendering. Rendered output is
/// trimmed so that it can be spliced into a shell command line.
pub trait CommandEngine {
    /// Renders a template with the provided context.
    ///
    /// # Arguments
    ///
    /// * `template` - Name of the template to render (without extension)
    /// * `ctx` - Context data to use for rendering
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist, contains syntax
    /// errors, or rendering fails.
    fn render<T: Serialize>(&self, template: &str, ctx: &T) -> Result<String>;

    /// Lists all available template names, built-in and overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the override directory cannot be read.
    fn list_templates(&self) -> Result<Vec<String>>;
}
