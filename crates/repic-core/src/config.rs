//! Configuration types for a consensus run.
//!
//! All run paths derive from the work directory. Tool settings and
//! consensus parameters come from `<work_dir>/repic.toml` when present,
//! then from environment variables.

use crate::error::{RepicError, Result};
use crate::tools::fs::FsAdapter;
use crate::tools::fs_impl::StdFsAdapter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the REPIC installation directory.
pub const REPIC_HOME_VAR: &str = "REPIC_HOME";

/// Environment variable overriding the REPIC environment activation.
pub const REPIC_ENV_ACTIVATION_VAR: &str = "REPIC_ENV_ACTIVATION";

/// Environment variable providing the conda activation prefix.
pub const CONDA_ACTIVATION_CMD_VAR: &str = "CONDA_ACTIVATION_CMD";

/// Name of the per-run configuration file.
pub const CONFIG_FILE_NAME: &str = "repic.toml";

/// Main configuration of a consensus run.
#[derive(Debug, Clone, PartialEq)]
pub struct RepicConfig {
    /// Run directory (absolute path).
    pub work_dir: PathBuf,

    /// Scratch directory for intermediate files (`extra`).
    pub extra_dir: PathBuf,

    /// Root of the per-picker box-file folders handed to `get_cliques.py`.
    pub pickers_dir: PathBuf,

    /// Output folder of `get_cliques.py`, refined in place by `run_ilp.py`.
    pub cliques_dir: PathBuf,

    /// Consensus coordinate set document.
    pub output_file: PathBuf,

    /// Persisted run state.
    pub state_file: PathBuf,

    /// Run configuration file.
    pub config_file: PathBuf,

    /// REPIC installation and environment.
    pub repic: RepicEnvConfig,

    /// Consensus parameters.
    pub consensus: ConsensusParams,
}

impl RepicConfig {
    /// Creates a configuration with default settings for `work_dir`.
    pub fn new(work_dir: PathBuf) -> Self {
        let extra_dir = work_dir.join("extra");
        Self {
            pickers_dir: extra_dir.join("pickers"),
            cliques_dir: extra_dir.join("repicOutput"),
            output_file: work_dir.join("coordinates.json"),
            state_file: work_dir.join("state.toml"),
            config_file: work_dir.join(CONFIG_FILE_NAME),
            extra_dir,
            work_dir,
            repic: RepicEnvConfig::default(),
            consensus: ConsensusParams::default(),
        }
    }

    /// Loads the configuration of `work_dir` from disk and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::ConfigParseError` for invalid TOML and
    /// `RepicError::InvalidConfig` for out-of-range values.
    pub fn load(work_dir: PathBuf) -> Result<Self> {
        let mut config = Self::load_with(&StdFsAdapter::new(), work_dir)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file through `fs`, without environment
    /// overrides. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::ConfigParseError` for invalid TOML and
    /// `RepicError::InvalidConfig` for out-of-range values.
    pub fn load_with(fs: &dyn FsAdapter, work_dir: PathBuf) -> Result<Self> {
        let mut config = Self::new(work_dir);

        if !fs.exists(&config.config_file) {
            return Ok(config);
        }

        let content = fs.read_to_string(&config.config_file)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            RepicError::ConfigParseError(format!("{}: {}", config.config_file.display(), e))
        })?;

        file.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides; `lookup` returns a variable's value.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(home) = lookup(REPIC_HOME_VAR).filter(|v| !v.is_empty()) {
            self.repic.home = PathBuf::from(home);
        }
        if let Some(activation) = lookup(REPIC_ENV_ACTIVATION_VAR).filter(|v| !v.is_empty()) {
            self.repic.env_activation = activation;
        }
        if let Some(conda) = lookup(CONDA_ACTIVATION_CMD_VAR).filter(|v| !v.is_empty()) {
            self.repic.conda_activation = Some(conda);
        }
    }

    /// Checks consensus parameters.
    ///
    /// # Errors
    ///
    /// Returns `RepicError::InvalidConfig` if the box size or expected particle
    /// count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.consensus.box_size == 0 {
            return Err(RepicError::InvalidConfig(
                "consensus.box_size must be positive".to_string(),
            ));
        }
        if self.consensus.num_particles == 0 {
            return Err(RepicError::InvalidConfig(
                "consensus.num_particles must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// REPIC installation and runtime environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RepicEnvConfig {
    /// Directory of the REPIC checkout; scripts live in `repic/commands`.
    pub home: PathBuf,

    /// Command activating the REPIC environment.
    pub env_activation: String,

    /// Command making `conda` available, prepended to the activation.
    pub conda_activation: Option<String>,

    /// Interpreter used to launch the scripts.
    pub python: String,

    /// Directory of `.j2` files overriding the command templates.
    pub templates_dir: Option<PathBuf>,
}

impl Default for RepicEnvConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("repic-0"),
            env_activation: "conda activate repic".to_string(),
            conda_activation: None,
            python: "python".to_string(),
            templates_dir: None,
        }
    }
}

/// Parameters handed to the REPIC scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Particle box size in pixels (voxels).
    pub box_size: u32,

    /// Expected number of particles per image.
    pub num_particles: u32,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            box_size: 100,
            num_particles: 150,
        }
    }
}

/// On-disk shape of `repic.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    repic: RepicSection,
    consensus: ConsensusSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RepicSection {
    home: Option<PathBuf>,
    env_activation: Option<String>,
    conda_activation: Option<String>,
    python: Option<String>,
    templates_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConsensusSection {
    box_size: Option<u32>,
    num_particles: Option<u32>,
}

impl ConfigFile {
    fn apply(self, config: &mut RepicConfig) {
        let repic = &mut config.repic;
        if let Some(home) = self.repic.home {
            repic.home = home;
        }
        if let Some(activation) = self.repic.env_activation {
            repic.env_activation = activation;
        }
        if let Some(conda) = self.repic.conda_activation {
            repic.conda_activation = Some(conda);
        }
        if let Some(python) = self.repic.python {
            repic.python = python;
        }
        if let Some(dir) = self.repic.templates_dir {
            repic.templates_dir = Some(resolve(&config.work_dir, dir));
        }

        if let Some(box_size) = self.consensus.box_size {
            config.consensus.box_size = box_size;
        }
        if let Some(num_particles) = self.consensus.num_particles {
            config.consensus.num_particles = num_particles;
        }
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fs_mock::MockFsAdapter;
    use std::collections::HashMap;

    #[test]
    fn test_paths_derive_from_work_dir() {
        let config = RepicConfig::new(PathBuf::from("/runs/042"));
        assert_eq!(config.extra_dir, PathBuf::from("/runs/042/extra"));
        assert_eq!(config.pickers_dir, PathBuf::from("/runs/042/extra/pickers"));
        assert_eq!(config.cliques_dir, PathBuf::from("/runs/042/extra/repicOutput"));
        assert_eq!(config.output_file, PathBuf::from("/runs/042/coordinates.json"));
        assert_eq!(config.state_file, PathBuf::from("/runs/042/state.toml"));
    }

    #[test]
    fn test_relative_templates_dir_resolved_against_work_dir() {
        let fs = MockFsAdapter::new();
        fs.write(
            Path::new("/runs/1/repic.toml"),
            "[repic]\ntemplates_dir = \"templates\"\n",
        )
        .unwrap();

        let config = RepicConfig::load_with(&fs, PathBuf::from("/runs/1")).unwrap();
        assert_eq!(
            config.repic.templates_dir,
            Some(PathBuf::from("/runs/1/templates"))
        );
    }

    #[test]
    fn test_zero_box_size_rejected() {
        let fs = MockFsAdapter::new();
        fs.write(Path::new("/runs/1/repic.toml"), "[consensus]\nbox_size = 0\n")
            .unwrap();

        let result = RepicConfig::load_with(&fs, PathBuf::from("/runs/1"));
        assert!(matches!(result, Err(RepicError::InvalidConfig(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (REPIC_HOME_VAR, "/opt/repic"),
            (CONDA_ACTIVATION_CMD_VAR, "eval \"$(conda shell.bash hook)\""),
            (REPIC_ENV_ACTIVATION_VAR, ""),
        ]);

        let mut config = RepicConfig::new(PathBuf::from("/runs/1"));
        config.apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.repic.home, PathBuf::from("/opt/repic"));
        assert_eq!(
            config.repic.conda_activation.as_deref(),
            Some("eval \"$(conda shell.bash hook)\"")
        );
        // empty values leave the default in place
        assert_eq!(config.repic.env_activation, "conda activate repic");
    }
}
