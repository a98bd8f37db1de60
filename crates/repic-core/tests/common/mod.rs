//! Shared fixtures for the consensus run tests.

#![allow(dead_code)]

use repic_core::tools::fs::FsAdapter;
use repic_core::tools::fs_impl::StdFsAdapter;
use repic_core::tools::shell::{CommandOutput, Environ, ShellAdapter};
use repic_core::{Coordinate, CoordinateSet, Dimensionality, Image};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Stand-in for the REPIC scripts.
///
/// `get_cliques.py` is a no-op; `run_ilp.py` copies the box files of the
/// first picker into the clique output folder as the consensus.
#[derive(Debug, Clone)]
pub struct FakeRepicShell {
    work_dir: PathBuf,
    pub fail_on: Option<String>,
    pub history: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl FakeRepicShell {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            fail_on: None,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(work_dir: &Path, program: &str) -> Self {
        Self {
            fail_on: Some(program.to_string()),
            ..Self::new(work_dir)
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(|(cmd, _)| cmd.clone())
            .collect()
    }

    fn copy_consensus(&self) {
        let fs = StdFsAdapter::new();
        let picker = self.work_dir.join("extra/pickers/picker_0");
        let cliques = self.work_dir.join("extra/repicOutput");
        for name in fs.list_dir(&picker).unwrap() {
            let content = fs.read_to_string(&picker.join(&name)).unwrap();
            fs.write(&cliques.join(&name), &content).unwrap();
        }
    }
}

impl ShellAdapter for FakeRepicShell {
    fn run(
        &self,
        cmd: &str,
        env: &Environ,
        _cwd: Option<&Path>,
    ) -> repic_core::Result<CommandOutput> {
        self.history
            .lock()
            .unwrap()
            .push((cmd.to_string(), env.get("PYTHONPATH").map(str::to_string)));

        if let Some(program) = &self.fail_on
            && cmd.contains(program.as_str())
        {
            return Ok(CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("{program} crashed"),
            });
        }

        if cmd.contains("run_ilp.py") {
            self.copy_consensus();
        }

        Ok(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Writes a micrograph picker set with the given picks per image key.
pub fn write_micrograph_set(
    dir: &Path,
    name: &str,
    images: &[&str],
    picks: &[(&str, i64, i64)],
) -> PathBuf {
    let mut set = CoordinateSet::new(name, Dimensionality::Two, 64).with_images(
        images
            .iter()
            .map(|file| Image::micrograph(format!("/data/mics/{file}")))
            .collect(),
    );
    for (key, x, y) in picks {
        set.append(Coordinate::planar(*key, *x, *y, 64)).unwrap();
    }
    save(dir, name, &set)
}

/// Writes a tomogram picker set with the given picks per series id.
pub fn write_tomogram_set(
    dir: &Path,
    name: &str,
    series: &[&str],
    picks: &[(&str, i64, i64, i64)],
) -> PathBuf {
    let mut set = CoordinateSet::new(name, Dimensionality::Three, 32)
        .with_images(
            series
                .iter()
                .map(|ts| Image::tomogram(format!("/data/tomos/{ts}.mrc"), *ts))
                .collect(),
        )
        .with_sampling_rate(13.48);
    for (key, x, y, z) in picks {
        set.append(Coordinate::volumetric(*key, *x, *y, *z, 32))
            .unwrap();
    }
    save(dir, name, &set)
}

fn save(dir: &Path, name: &str, set: &CoordinateSet) -> PathBuf {
    let path = dir.join(format!("{name}.json"));
    set.save(&StdFsAdapter::new(), &path).unwrap();
    path
}
