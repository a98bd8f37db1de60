//! Command manager implementation using minijinja.

use crate::{
    engine::CommandEngine,
    error::{CommandError, Result},
};
use minijinja::UndefinedBehavior;
use serde::Serialize;
use std::path::PathBuf;

/// Built-in templates, keyed by name without the `.j2` extension.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "run_repic",
        "{% if activation %}{{ activation }} && {% endif %}{{ python }} {{ script | shell_quote }} {{ args }}",
    ),
    (
        "get_cliques_args",
        "{{ input_dir | shell_quote }} {{ output_dir | shell_quote }} {{ box_size }}",
    ),
    (
        "run_ilp_args",
        "--num_particles {{ num_particles }} {{ cliques_dir | shell_quote }} {{ box_size }}",
    ),
];

/// Quotes `value` as a single POSIX shell word.
///
/// Values made only of characters the shell never interprets are returned
/// unchanged; anything else is wrapped in single quotes.
pub fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));
    if plain {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

fn builtin_source(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

/// Manager for loading and rendering REPIC command templates.
///
/// Templates are looked up in the override directory first (as
/// `<name>.j2`) and fall back to the built-in set.
///
/// # Examples
///
/// ```
/// use repic_cmd::{CommandEngine, CommandManager, RunIlpArgs};
/// use std::path::PathBuf;
///
/// let manager = CommandManager::builtin();
/// let args = RunIlpArgs {
///     num_particles: 150,
///     cliques_dir: PathBuf::from("/run/extra/repicOutput"),
///     box_size: 100,
/// };
/// let rendered = manager.render("run_ilp_args", &args)?;
/// assert_eq!(rendered, "--num_particles 150 /run/extra/repicOutput 100");
/// # Ok::<(), repic_cmd::CommandError>(())
/// ```
#[derive(Debug)]
pub struct CommandManager {
    /// Directory whose `.j2` files override the built-in templates.
    pub templates_dir: Option<PathBuf>,
    /// Minijinja environment for template rendering.
    env: minijinja::Environment<'static>,
}

impl CommandManager {
    /// Creates a manager that only knows the built-in templates.
    pub fn builtin() -> Self {
        Self {
            templates_dir: None,
            env: Self::environment(None),
        }
    }

    /// Creates a manager whose templates can be overridden from `templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or is not a directory.
    pub fn with_overrides(templates_dir: PathBuf) -> Result<Self> {
        if !templates_dir.is_dir() {
            return Err(CommandError::TemplateDirectoryNotFound(templates_dir));
        }

        Ok(Self {
            env: Self::environment(Some(templates_dir.clone())),
            templates_dir: Some(templates_dir),
        })
    }

    fn environment(templates_dir: Option<PathBuf>) -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("shell_quote", shell_quote);

        let overrides = templates_dir.map(minijinja::path_loader);
        env.set_loader(move |name| {
            if let Some(load) = &overrides
                && let Some(source) = load(name)?
            {
                return Ok(Some(source));
            }
            let stem = name.strip_suffix(".j2").unwrap_or(name);
            Ok(builtin_source(stem).map(str::to_string))
        });

        env
    }

    fn load_template(&self, name: &str) -> Result<minijinja::Template<'_, '_>> {
        let template_name = format!("{name}.j2");
        self.env
            .get_template(&template_name)
            .map_err(|e| CommandError::TemplateNotFound(format!("{name}: {e}")))
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CommandEngine for CommandManager {
    fn render<T: Serialize>(&self, template: &str, ctx: &T) -> Result<String> {
        let tmpl = self.load_template(template)?;
        tmpl.render(ctx)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|e| CommandError::TemplateRenderError(format!("{template}: {e}")))
    }

    fn list_templates(&self) -> Result<Vec<String>> {
        let mut templates: Vec<String> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();

        if let Some(dir) = &self.templates_dir {
            let entries = std::fs::read_dir(dir).map_err(|source| {
                CommandError::TemplateListError {
                    path: dir.clone(),
                    source,
                }
            })?;

            for entry in entries {
                let entry = entry.map_err(|source| CommandError::TemplateListError {
                    path: dir.clone(),
                    source,
                })?;

                let path = entry.path();
                if path.is_file()
                    && let Some(ext) = path.extension()
                    && ext == "j2"
                    && let Some(name) = path.file_stem()
                    && let Some(name_str) = name.to_str()
                {
                    templates.push(name_str.to_string());
                }
            }
        }

        templates.sort();
        templates.dedup();
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{GetCliquesArgs, RunRepicContext};
    use std::fs;
    use tempfile::TempDir;

    fn run_ctx(activation: &str) -> RunRepicContext {
        RunRepicContext {
            activation: activation.to_string(),
            python: "python3".to_string(),
            script: PathBuf::from("/opt/repic/repic/commands/get_cliques.py"),
            args: "/in /out 64".to_string(),
        }
    }

    #[test]
    fn test_render_run_repic_with_activation() {
        let manager = CommandManager::builtin();
        let line = manager
            .render("run_repic", &run_ctx("conda activate repic"))
            .unwrap();
        assert_eq!(
            line,
            "conda activate repic && python3 /opt/repic/repic/commands/get_cliques.py /in /out 64"
        );
    }

    #[test]
    fn test_render_run_repic_without_activation() {
        let manager = CommandManager::builtin();
        let line = manager.render("run_repic", &run_ctx("")).unwrap();
        assert_eq!(
            line,
            "python3 /opt/repic/repic/commands/get_cliques.py /in /out 64"
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/run/extra/pickers"), "/run/extra/pickers");
        assert_eq!(shell_quote("/data/my run"), "'/data/my run'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$HOME;rm"), "'$HOME;rm'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_paths_with_spaces_stay_single_arguments() {
        let manager = CommandManager::builtin();
        let args = GetCliquesArgs {
            input_dir: PathBuf::from("/data/my run/extra/pickers"),
            output_dir: PathBuf::from("/data/my run/extra/repicOutput"),
            box_size: 64,
        };
        assert_eq!(
            manager.render("get_cliques_args", &args).unwrap(),
            "'/data/my run/extra/pickers' '/data/my run/extra/repicOutput' 64"
        );

        let ctx = RunRepicContext {
            script: PathBuf::from("/opt/REPIC home/repic/commands/run_ilp.py"),
            ..run_ctx("")
        };
        assert_eq!(
            manager.render("run_repic", &ctx).unwrap(),
            "python3 '/opt/REPIC home/repic/commands/run_ilp.py' /in /out 64"
        );
    }

    #[test]
    fn test_render_unknown_template_fails() {
        let manager = CommandManager::builtin();
        let result = manager.render("does_not_exist", &run_ctx(""));
        assert!(matches!(result, Err(CommandError::TemplateNotFound(_))));
    }

    #[test]
    fn test_missing_context_field_fails() {
        let manager = CommandManager::builtin();
        let args = GetCliquesArgs {
            input_dir: PathBuf::from("/in"),
            output_dir: PathBuf::from("/out"),
            box_size: 64,
        };
        // get_cliques_args context has no `python` field
        let result = manager.render("run_repic", &args);
        assert!(matches!(result, Err(CommandError::TemplateRenderError(_))));
    }

    #[test]
    fn test_override_directory_takes_precedence() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("get_cliques_args.j2"),
            "--multi_out {{ input_dir }} {{ output_dir }} {{ box_size }}\n",
        )
        .unwrap();

        let manager = CommandManager::with_overrides(temp_dir.path().to_path_buf()).unwrap();
        let args = GetCliquesArgs {
            input_dir: PathBuf::from("/in"),
            output_dir: PathBuf::from("/out"),
            box_size: 64,
        };
        assert_eq!(
            manager.render("get_cliques_args", &args).unwrap(),
            "--multi_out /in /out 64"
        );

        // Templates without an override still resolve to the built-ins
        let line = manager.render("run_repic", &run_ctx("")).unwrap();
        assert!(line.starts_with("python3 "));
    }

    #[test]
    fn test_missing_override_directory() {
        let result = CommandManager::with_overrides(PathBuf::from("/nonexistent/templates"));
        assert!(matches!(
            result,
            Err(CommandError::TemplateDirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_list_templates_merges_overrides() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("run_ilp_args.j2"), "x").unwrap();
        fs::write(temp_dir.path().join("extra_stage.j2"), "y").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "z").unwrap();

        let manager = CommandManager::with_overrides(temp_dir.path().to_path_buf()).unwrap();
        let templates = manager.list_templates().unwrap();

        assert_eq!(
            templates,
            vec![
                "extra_stage".to_string(),
                "get_cliques_args".to_string(),
                "run_ilp_args".to_string(),
                "run_repic".to_string(),
            ]
        );
    }
}
