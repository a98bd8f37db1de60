//! End-to-end consensus runs against a fake REPIC installation.

mod common;

use common::{FakeRepicShell, write_micrograph_set, write_tomogram_set};
use repic_core::tools::fs_impl::StdFsAdapter;
use repic_core::{
    ConsensusRuntime, CoordinateSet, Dimensionality, Position, RepicConfig, RepicError, Runtime,
    Step, ToolRegistry,
};
use std::fs;
use tempfile::TempDir;

fn runtime_with(
    temp: &TempDir,
    shell: FakeRepicShell,
    inputs: Vec<std::path::PathBuf>,
) -> ConsensusRuntime {
    let config = RepicConfig::new(temp.path().join("run"));
    let tools = ToolRegistry::new(Box::new(StdFsAdapter::new()), Box::new(shell));
    ConsensusRuntime::with_tools(config, tools, inputs).unwrap()
}

#[test]
fn test_micrograph_consensus_run() {
    let temp = TempDir::new().unwrap();
    let cryolo = write_micrograph_set(
        temp.path(),
        "cryolo",
        &["mic1.mrc", "mic2.mrc"],
        &[("mic1.mrc", 1, 1), ("mic2.mrc", 10, 20), ("mic2.mrc", 30, 40)],
    );
    let topaz = write_micrograph_set(
        temp.path(),
        "topaz",
        &["mic2.mrc", "mic3.mrc"],
        &[("mic2.mrc", 11, 21), ("mic3.mrc", 5, 5)],
    );

    let shell = FakeRepicShell::new(&temp.path().join("run"));
    let mut runtime = runtime_with(&temp, shell.clone(), vec![cryolo, topaz]);
    runtime.run().unwrap();

    let work_dir = temp.path().join("run");
    let pickers = work_dir.join("extra/pickers");
    assert_eq!(
        fs::read_to_string(pickers.join("picker_0/mic2.mrc.box")).unwrap(),
        "10 20 100 100 1\n30 40 100 100 1\n"
    );
    assert_eq!(
        fs::read_to_string(pickers.join("picker_1/mic2.mrc.box")).unwrap(),
        "11 21 100 100 1\n"
    );
    assert!(!pickers.join("picker_0/mic1.mrc.box").exists());
    assert!(!pickers.join("picker_1/mic3.mrc.box").exists());

    let output = CoordinateSet::load(&StdFsAdapter::new(), &work_dir.join("coordinates.json"))
        .unwrap();
    assert_eq!(output.name, "consensus");
    assert_eq!(output.box_size, 64);
    assert_eq!(output.sources, vec!["cryolo", "topaz"]);
    assert_eq!(output.len(), 2);
    let positions: Vec<_> = output.coordinates().iter().map(|c| c.position).collect();
    assert_eq!(
        positions,
        vec![
            Position::Planar { x: 10, y: 20 },
            Position::Planar { x: 30, y: 40 }
        ]
    );

    assert_eq!(
        runtime.summary().last().map(String::as_str),
        Some("REPIC protocol has found 2 particles.")
    );
}

#[test]
fn test_repic_invocations() {
    let temp = TempDir::new().unwrap();
    let a = write_micrograph_set(temp.path(), "a", &["mic1.mrc"], &[("mic1.mrc", 10, 20)]);
    let b = write_micrograph_set(temp.path(), "b", &["mic1.mrc"], &[("mic1.mrc", 12, 22)]);

    let work_dir = temp.path().join("run");
    let shell = FakeRepicShell::new(&work_dir);
    let mut runtime = runtime_with(&temp, shell.clone(), vec![a, b]);
    runtime.run().unwrap();

    let commands = shell.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0],
        format!(
            "conda activate repic && python repic-0/repic/commands/get_cliques.py {} {} 100",
            work_dir.join("extra/pickers").display(),
            work_dir.join("extra/repicOutput").display()
        )
    );
    assert_eq!(
        commands[1],
        format!(
            "conda activate repic && python repic-0/repic/commands/run_ilp.py --num_particles 150 {} 100",
            work_dir.join("extra/repicOutput").display()
        )
    );

    let history = shell.history.lock().unwrap();
    assert!(
        history
            .iter()
            .all(|(_, pythonpath)| pythonpath.as_deref() == Some("repic-0"))
    );
}

#[test]
fn test_tomogram_consensus_run() {
    let temp = TempDir::new().unwrap();
    let a = write_tomogram_set(temp.path(), "a", &["TS_01", "TS_02"], &[("TS_01", 5, 6, 7)]);
    let b = write_tomogram_set(temp.path(), "b", &["TS_01"], &[("TS_01", 6, 6, 8)]);

    let work_dir = temp.path().join("run");
    let mut runtime = runtime_with(&temp, FakeRepicShell::new(&work_dir), vec![a, b]);
    runtime.run().unwrap();

    assert_eq!(
        fs::read_to_string(work_dir.join("extra/pickers/picker_0/TS_01.box")).unwrap(),
        "5 6 7 100 100 100 1\n"
    );

    let output = CoordinateSet::load(&StdFsAdapter::new(), &work_dir.join("coordinates.json"))
        .unwrap();
    assert_eq!(output.dimensionality, Dimensionality::Three);
    assert_eq!(output.sampling_rate, Some(13.48));
    assert_eq!(output.len(), 1);

    let pick = &output.coordinates()[0];
    assert_eq!(pick.id, Some(1));
    assert_eq!(pick.position, Position::Volumetric { x: 5, y: 6, z: 7 });
    assert_eq!(pick.box_size, 32);
    assert_eq!(pick.sampling_rate, Some(13.48));
    assert_eq!(
        pick.image.as_ref().and_then(|image| image.ts_id.as_deref()),
        Some("TS_01")
    );
}

#[test]
fn test_no_shared_images_is_an_empty_run() {
    let temp = TempDir::new().unwrap();
    let a = write_micrograph_set(temp.path(), "a", &["mic1.mrc"], &[("mic1.mrc", 1, 1)]);
    let b = write_micrograph_set(temp.path(), "b", &["mic2.mrc"], &[("mic2.mrc", 2, 2)]);

    let work_dir = temp.path().join("run");
    let mut runtime = runtime_with(&temp, FakeRepicShell::new(&work_dir), vec![a, b]);
    runtime.run().unwrap();

    assert_eq!(runtime.state.common_images, 0);
    assert_eq!(runtime.state.picked_particles, 0);
    assert!(work_dir.join("coordinates.json").exists());
}

#[test]
fn test_failing_repic_script_fails_the_run() {
    let temp = TempDir::new().unwrap();
    let a = write_micrograph_set(temp.path(), "a", &["mic1.mrc"], &[("mic1.mrc", 1, 1)]);
    let b = write_micrograph_set(temp.path(), "b", &["mic1.mrc"], &[("mic1.mrc", 2, 2)]);

    let work_dir = temp.path().join("run");
    let shell = FakeRepicShell::failing_on(&work_dir, "get_cliques.py");
    let mut runtime = runtime_with(&temp, shell.clone(), vec![a, b]);

    let err = runtime.run().unwrap_err();
    assert!(matches!(
        err,
        RepicError::ExternalToolFailed { exit_code: 1, .. }
    ));
    assert_eq!(runtime.state.next_step(), Some(Step::GetCliques));
    assert!(!shell.commands().iter().any(|cmd| cmd.contains("run_ilp.py")));
    assert!(!work_dir.join("coordinates.json").exists());
}

#[test]
fn test_mixed_dimensionality_is_rejected() {
    let temp = TempDir::new().unwrap();
    let a = write_micrograph_set(temp.path(), "a", &["mic1.mrc"], &[]);
    let b = write_tomogram_set(temp.path(), "b", &["TS_01"], &[]);

    let work_dir = temp.path().join("run");
    let mut runtime = runtime_with(&temp, FakeRepicShell::new(&work_dir), vec![a, b]);
    let err = runtime.run().unwrap_err();
    assert!(matches!(err, RepicError::DimensionMismatch { .. }));
}
