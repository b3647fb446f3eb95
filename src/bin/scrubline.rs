use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scrubline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a scene JSON file.
    Check(CheckArgs),
    /// Replay a scene's scroll script and write one JSON report per frame.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of frames (defaults to the scene's `simulation.frames`).
    #[arg(long)]
    frames: Option<u64>,

    /// Frames per second (defaults to the scene's `simulation.fps`).
    #[arg(long)]
    fps: Option<f64>,

    /// Output JSON Lines path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let scene = scrubline::Scene::from_path(&args.in_path)?;
    scene
        .validate()
        .with_context(|| format!("check '{}'", args.in_path.display()))?;
    eprintln!(
        "ok: {} ({} elements, {} script steps)",
        args.in_path.display(),
        scene.def().elements.len(),
        scene.def().script.len()
    );
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let scene = scrubline::Scene::from_path(&args.in_path)?;
    let opts = scrubline::SimulationOptions {
        frames: args.frames,
        fps: args.fps,
    };
    let mut sim = scrubline::Simulation::new(&scene, opts)
        .with_context(|| format!("build scene '{}'", args.in_path.display()))?;

    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut written = 0u64;
    for report in sim.by_ref() {
        serde_json::to_writer(&mut out, &report).context("serialize frame report")?;
        out.write_all(b"\n").context("write frame report")?;
        written += 1;
    }
    out.flush().context("flush frame reports")?;
    sim.finish();

    match &args.out {
        Some(path) => eprintln!("wrote {written} frames to {}", path.display()),
        None => tracing::info!(frames = written, "simulation finished"),
    }
    Ok(())
}
