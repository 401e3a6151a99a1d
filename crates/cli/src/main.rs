#![deny(unsafe_code)]
//! Headless CLI for the physarum simulation.
//!
//! Subcommands:
//! - `render [engine]`: run N ticks, write the final frame (and optionally a
//!   frame sequence) as PNG
//! - `replay <spec>`: run a saved `RunSpec` JSON file
//! - `list`: print available engines
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG` to override the
//! default `physarum=info` filter.

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use physarum_core::{Engine, RunSpec};
use physarum_engines::snapshot::write_png;
use physarum_engines::EngineKind;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "physarum", about = "Physarum trail simulation")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where and how often to dump intermediate frames.
#[derive(clap::Args, Debug, Clone)]
struct FrameArgs {
    /// Directory receiving `frame_NNNNNN.png` files while the run advances.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Write a frame every N ticks (with --frames-dir).
    #[arg(long, default_value_t = 1)]
    every: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Run an engine for N ticks and write a PNG of the final frame.
    Render {
        /// Engine name.
        #[arg(default_value = "physarum")]
        engine: String,

        /// Grid width in cells.
        #[arg(short = 'W', long, default_value_t = 1920)]
        width: usize,

        /// Grid height in cells.
        #[arg(short = 'H', long, default_value_t = 1080)]
        height: usize,

        /// Number of ticks to run.
        #[arg(short, long, default_value_t = 500)]
        ticks: u64,

        /// PRNG seed for agent spawning and re-randomisation.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// key=value file re-read while running (overrides params.config_path).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also save the run as a replayable RunSpec JSON file.
        #[arg(long)]
        save_spec: Option<PathBuf>,

        #[command(flatten)]
        frames: FrameArgs,
    },
    /// Run a saved RunSpec JSON file and write a PNG of the final frame.
    Replay {
        /// Path to the RunSpec JSON file.
        spec: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        #[command(flatten)]
        frames: FrameArgs,
    },
    /// List available engines.
    List,
}

/// Parses `--params` and folds `--config` into it as `config_path`.
fn build_params(raw: &str, config: Option<&Path>) -> Result<Value, CliError> {
    let mut params: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let obj = params
        .as_object_mut()
        .ok_or_else(|| CliError::Input("--params must be a JSON object".into()))?;
    if let Some(path) = config {
        obj.insert(
            "config_path".into(),
            Value::String(path.display().to_string()),
        );
    }
    Ok(params)
}

fn frame_path(dir: &Path, tick: u64) -> PathBuf {
    dir.join(format!("frame_{tick:06}.png"))
}

/// Advances `engine` by `ticks`, dumping frames as requested, then writes
/// the final frame to `output`. Returns the number of intermediate frames.
fn run_engine(
    engine: &mut EngineKind,
    ticks: u64,
    frames: &FrameArgs,
    output: &Path,
) -> Result<u64, CliError> {
    if frames.every == 0 {
        return Err(CliError::Input("--every must be at least 1".into()));
    }
    if let Some(dir) = &frames.frames_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| CliError::Io(format!("{}: {e}", dir.display())))?;
    }

    let mut written = 0;
    for _ in 0..ticks {
        engine.step()?;
        if let Some(dir) = &frames.frames_dir {
            if engine.tick() % frames.every == 0 {
                let path = frame_path(dir, engine.tick());
                write_png(engine.field(), &path)?;
                debug!(tick = engine.tick(), path = %path.display(), "frame written");
                written += 1;
            }
        }
    }

    write_png(engine.field(), output)?;
    Ok(written)
}

fn report(json: bool, spec: &RunSpec, output: &Path, frames: u64) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "engine": spec.engine,
            "width": spec.width,
            "height": spec.height,
            "ticks": spec.ticks,
            "seed": spec.seed,
            "frames": frames,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} ticks, seed {}) -> {}",
            spec.engine,
            spec.width,
            spec.height,
            spec.ticks,
            spec.seed,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            if cli.json {
                let info = serde_json::json!({ "engines": engines });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
            }
        }
        Command::Render {
            engine,
            width,
            height,
            ticks,
            seed,
            output,
            params,
            config,
            save_spec,
            frames,
        } => {
            let params = build_params(&params, config.as_deref())?;
            let spec = RunSpec::new(&engine, width, height, seed)
                .with_params(params)
                .with_ticks(ticks);

            if let Some(path) = &save_spec {
                let text = serde_json::to_string_pretty(&spec)?;
                std::fs::write(path, text)
                    .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
                info!(path = %path.display(), "run spec saved");
            }

            let mut eng = EngineKind::from_spec(&spec)?;
            let written = run_engine(&mut eng, spec.ticks, &frames, &output)?;
            report(cli.json, &spec, &output, written)?;
        }
        Command::Replay {
            spec,
            output,
            frames,
        } => {
            let spec = RunSpec::load(&spec)?;
            info!(engine = %spec.engine, ticks = spec.ticks, "replaying run spec");
            let mut eng = EngineKind::from_spec(&spec)?;
            let written = run_engine(&mut eng, spec.ticks, &frames, &output)?;
            report(cli.json, &spec, &output, written)?;
        }
    }

    Ok(())
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("physarum=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
