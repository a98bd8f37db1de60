//! repic-bridge - REPIC consensus particle picking bridge
//!
//! Command-line interface for running REPIC over several particle picker
//! coordinate sets and for the individual conversion steps.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repic_core::boxfile::image_key_of;
use repic_core::reconcile::reconcile_images;
use repic_core::tools::fs::FsAdapter;
use repic_core::tools::fs_impl::StdFsAdapter;
use repic_core::workflows::{collect_consensus, validate_inputs};
use repic_core::{ConsensusRuntime, CoordinateSet, RepicConfig, RunState, Runtime};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// repic-bridge - consensus particle picking with REPIC
///
/// Reconciles the micrographs or tomograms shared by several pickers, runs
/// the REPIC clique finder and ILP optimizer, and imports the consensus.
#[derive(Parser)]
#[command(name = "repic-bridge", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run a full consensus over two or more picker sets
    ///
    /// Progress is recorded in the work directory; re-running over the same
    /// inputs continues where the last run stopped.
    Run {
        /// Work directory holding box files, run state and the output set
        #[arg(short, long)]
        work_dir: PathBuf,

        /// Picker coordinate set (JSON), one per picker
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Particle box size in pixels, overriding repic.toml
        #[arg(long)]
        box_size: Option<u32>,

        /// Expected particles per image, overriding repic.toml
        #[arg(long)]
        num_particles: Option<u32>,
    },

    /// Resume an interrupted run
    Resume {
        /// Work directory of the run
        #[arg(short, long)]
        work_dir: PathBuf,
    },

    /// Print the image keys shared by every picker set
    Reconcile {
        /// Picker coordinate set (JSON)
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },

    /// Export box files of the shared images, one folder per picker
    Export {
        /// Picker coordinate set (JSON)
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Folder receiving `picker_<i>/<image>.box`
        #[arg(short, long)]
        out: PathBuf,

        /// Particle box size in pixels
        #[arg(long, default_value_t = 100)]
        box_size: u32,
    },

    /// Import consensus box files into a coordinate set
    Import {
        /// Folder holding one `<image>.box` per image; other files are ignored
        #[arg(long)]
        box_dir: PathBuf,

        /// Set providing images, box size and sampling rate
        #[arg(short, long)]
        reference: PathBuf,

        /// Path of the coordinate set to write
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show the progress of a run
    Summary {
        /// Work directory of the run
        #[arg(short, long)]
        work_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run_command(cli.command).await {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing subscriber for structured logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if verbose {
        EnvFilter::new("repic_bridge=debug,repic_core=debug,repic_cmd=debug")
    } else {
        EnvFilter::new("repic_bridge=info,repic_core=info,repic_cmd=info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the specified command
async fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            work_dir,
            inputs,
            box_size,
            num_particles,
        } => {
            info!("Starting consensus run in {}", work_dir.display());
            run_consensus(work_dir, inputs, box_size, num_particles).await
        }
        Commands::Resume { work_dir } => {
            info!("Resuming consensus run in {}", work_dir.display());
            run_resume(work_dir).await
        }
        Commands::Reconcile { inputs } => run_reconcile(&inputs),
        Commands::Export {
            inputs,
            out,
            box_size,
        } => run_export(&inputs, &out, box_size),
        Commands::Import {
            box_dir,
            reference,
            out,
        } => run_import(&box_dir, &reference, &out),
        Commands::Summary { work_dir } => run_summary(&work_dir),
    }
}

/// Run the run command
async fn run_consensus(
    work_dir: PathBuf,
    inputs: Vec<PathBuf>,
    box_size: Option<u32>,
    num_particles: Option<u32>,
) -> Result<()> {
    std::fs::create_dir_all(&work_dir)
        .with_context(|| format!("Failed to create work directory {}", work_dir.display()))?;
    let work_dir = absolute(&work_dir)?;
    let inputs = inputs
        .iter()
        .map(|path| absolute(path))
        .collect::<Result<Vec<_>>>()?;

    let mut config = RepicConfig::load(work_dir).context("Failed to load configuration")?;
    if let Some(box_size) = box_size {
        config.consensus.box_size = box_size;
    }
    if let Some(num_particles) = num_particles {
        config.consensus.num_particles = num_particles;
    }
    config.validate()?;

    let summary = tokio::task::spawn_blocking(move || -> repic_core::Result<Vec<String>> {
        let mut runtime = ConsensusRuntime::new(config, inputs)?;
        runtime.run()?;
        Ok(runtime.summary())
    })
    .await
    .context("Consensus run aborted")?
    .context("Consensus run failed")?;

    for line in summary {
        println!("{}", line);
    }
    Ok(())
}

/// Run the resume command
async fn run_resume(work_dir: PathBuf) -> Result<()> {
    let work_dir = absolute(&work_dir)?;
    let config = RepicConfig::load(work_dir).context("Failed to load configuration")?;

    let summary = tokio::task::spawn_blocking(move || -> repic_core::Result<Vec<String>> {
        let mut runtime = ConsensusRuntime::resume(config)?;
        runtime.run()?;
        Ok(runtime.summary())
    })
    .await
    .context("Consensus run aborted")?
    .context("Failed to resume consensus run")?;

    for line in summary {
        println!("{}", line);
    }
    Ok(())
}

/// Run the reconcile command
fn run_reconcile(inputs: &[PathBuf]) -> Result<()> {
    let sets = load_sets(inputs)?;
    for key in reconcile_images(&sets).keys() {
        println!("{}", key);
    }
    Ok(())
}

/// Run the export command
fn run_export(inputs: &[PathBuf], out: &Path, box_size: u32) -> Result<()> {
    if box_size == 0 {
        anyhow::bail!("--box-size must be positive");
    }

    let sets = load_sets(inputs)?;
    validate_inputs(&sets)?;

    let fs = StdFsAdapter::new();
    let images = reconcile_images(&sets);
    fs.create_dir_all(out)?;
    for key in images.keys() {
        repic_core::bridge::export_box_files(&fs, key, &sets, box_size, out)
            .with_context(|| format!("Failed to export box files for {}", key))?;
    }

    println!(
        "Exported {} shared images for {} pickers to {}",
        images.len(),
        sets.len(),
        out.display()
    );
    Ok(())
}

/// Run the import command
fn run_import(box_dir: &Path, reference: &Path, out: &Path) -> Result<()> {
    let fs = StdFsAdapter::new();
    let reference = CoordinateSet::load(&fs, reference)
        .with_context(|| format!("Failed to load reference set {}", reference.display()))?;

    let keys = fs
        .list_dir(box_dir)
        .with_context(|| format!("Failed to list {}", box_dir.display()))?
        .iter()
        .filter_map(|name| image_key_of(name))
        .collect::<BTreeSet<_>>();
    let output = collect_consensus(&fs, box_dir, &keys, &reference)
        .context("Failed to import consensus box files")?;
    output.save(&fs, out)?;

    println!("REPIC protocol has found {} particles.", output.len());
    Ok(())
}

/// Run the summary command
fn run_summary(work_dir: &Path) -> Result<()> {
    let config = RepicConfig::new(work_dir.to_path_buf());
    let state = RunState::load(&StdFsAdapter::new(), &config.state_file)
        .context("No consensus run found")?;

    for line in state.summary() {
        println!("{}", line);
    }
    Ok(())
}

fn load_sets(paths: &[PathBuf]) -> Result<Vec<CoordinateSet>> {
    let fs = StdFsAdapter::new();
    paths
        .iter()
        .map(|path| {
            CoordinateSet::load(&fs, path)
                .with_context(|| format!("Failed to load picker set {}", path.display()))
        })
        .collect()
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))
}
