//! Tideon CLI
//!
//! Play, validate, and scaffold Tideon scene files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod driver;
mod scene;

use config::SceneConfig;
use driver::{Driver, OutputFormat};
use scene::Scene;

#[derive(Parser)]
#[command(name = "tideon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tideon frame-stepped animation player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scene, printing target values after every tick
    Run {
        /// Scene file
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,

        /// Milliseconds between ticks (overrides the scene file)
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Stop after this many ticks
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Tick back to back instead of waiting between ticks
        #[arg(long)]
        headless: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check a scene file for errors
    Validate {
        /// Scene file
        #[arg(default_value = "scene.toml")]
        scene: PathBuf,
    },

    /// Write a sample scene
    Init {
        /// Where to write the scene
        #[arg(default_value = "scene.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scene,
            interval_ms,
            ticks,
            headless,
            format,
        } => cmd_run(&scene, interval_ms, ticks, headless, format),

        Commands::Validate { scene } => cmd_validate(&scene),

        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

fn cmd_run(
    path: &Path,
    interval_ms: Option<u64>,
    ticks: Option<u64>,
    headless: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = SceneConfig::load(path)?;
    let interval = interval_ms.unwrap_or(config.scene.interval_ms);
    if interval == 0 {
        anyhow::bail!("--interval-ms must be at least 1");
    }

    let scene = Scene::build(&config)?;
    info!(
        "Playing {} ({} stages, {})",
        scene.name,
        scene.animator.stage_count(),
        if headless {
            "headless".to_string()
        } else {
            format!("{interval}ms per tick")
        }
    );

    let mut driver = Driver::new(scene, io::stdout().lock(), format, ticks);
    if headless {
        driver.run_headless()?;
    } else {
        driver.run_timed(Duration::from_millis(interval))?;
    }

    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let config = SceneConfig::load(path)?;
    let scene = Scene::build(&config)?;

    let steps: usize = config.stages.iter().map(|s| s.steps.len()).sum();
    info!(
        "{} is valid: {} targets, {} stages, {} steps",
        path.display(),
        scene.targets.len(),
        scene.animator.stage_count(),
        steps
    );
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("scene");

    let config = SceneConfig::sample(name);
    fs::write(path, config.to_toml()?)?;

    info!("Scene written to {}", path.display());
    info!("Play it with `tideon run {}`", path.display());
    Ok(())
}
