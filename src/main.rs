mod app;
mod camera;
mod config;
mod error;
mod framebuffer;
mod garage;
mod input;
mod lighting;
mod material;
mod mesh;
mod rasterizer;
mod renderer;
mod scene;
mod sim;
mod texture;
mod vehicle;
mod vertex;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::SceneConfig;

const DEFAULT_SSAA: usize = 2;

/// 车库与车灯的交互式软件渲染演示
#[derive(Parser, Debug)]
#[command(name = "garage-drive")]
#[command(about = "Drive a car into a garage, rendered by a software rasterizer", long_about = None)]
struct Args {
    /// JSON scene configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render one frame to this PNG and exit instead of opening a window
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Supersampling factor for snapshots
    #[arg(long, default_value_t = DEFAULT_SSAA)]
    ssaa: usize,

    /// Start at night
    #[arg(short, long)]
    night: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if args.night {
        config.night = true;
    }

    match &args.snapshot {
        Some(path) => app::run_snapshot(&config, path, args.ssaa)
            .with_context(|| format!("snapshot to {} failed", path.display()))?,
        None => {
            if args.ssaa != DEFAULT_SSAA {
                warn!(ssaa = args.ssaa, "--ssaa only applies to --snapshot, ignored");
            }
            app::run_window(&config).context("interactive window failed")?
        }
    }
    Ok(())
}
