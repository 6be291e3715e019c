//! Headless Light Years runner

use anyhow::{Context, Result};
use clap::Parser;
use lightyears::demo::{self, ConsoleHud};
use lightyears::{Application, EngineConfig, HeadlessWindow, PlayerStats};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lightyears")]
#[command(about = "Run the Light Years demo level without a display")]
pub struct Args {
    /// Engine configuration file (TOML or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to present before the window closes
    #[arg(long, default_value = "600")]
    frames: u64,

    /// Seed for drone placement
    #[arg(long)]
    seed: Option<u64>,

    /// Pace the loop with the wall clock instead of stepping as fast as possible
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    info!(
        "Starting {} v{} ({} frames)",
        config.window.title,
        lightyears::VERSION,
        args.frames
    );

    let window = HeadlessWindow::new(config.window.width, config.window.height, Some(args.frames));
    let mut app = Application::new(window, &config);

    let player = Rc::new(RefCell::new(PlayerStats::default()));
    let hud = ConsoleHud::new();
    app.load_world(|world| demo::setup(world, seed, &player, &hud))
        .context("building demo level")?;

    if args.realtime {
        app.run();
    } else {
        app.run_simulated();
    }

    let hud = hud.borrow();
    info!("Finished after {} steps: {}", app.steps(), hud.summary());
    if hud.all_waves_cleared {
        info!("All waves cleared");
    }
    info!("Final score: {}", player.borrow().score());
    Ok(())
}
