//! Octree sandbox
//!
//! Drops a field of spheres and boxes onto the floor and runs the fixed-step
//! physics headless, logging a report per tick.
//!
//! Usage: `octree_sandbox [config.toml|config.ron] [fixed_ticks]`

mod physics_app;
mod scene;

use std::path::Path;

use octvis_engine::foundation::logging;
use octvis_engine::prelude::*;
use thiserror::Error;

use physics_app::PhysicsApp;

const DEFAULT_CONFIG_PATH: &str = "sandbox_app/config/sandbox.toml";
const DEFAULT_FIXED_TICKS: u64 = 600;

#[derive(Error, Debug)]
enum SandboxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

fn load_config(path: Option<&str>) -> Result<SandboxConfig, ConfigError> {
    let config = match path {
        Some(path) => SandboxConfig::load_from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => SandboxConfig::load_from_file(DEFAULT_CONFIG_PATH)?,
        None => SandboxConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().map_err(Into::into)
}

fn run() -> Result<(), SandboxError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let fixed_ticks = match args.get(1) {
        Some(text) => text
            .parse::<u64>()
            .map_err(|e| SandboxError::Argument(format!("fixed tick count '{text}': {e}")))?,
        None => DEFAULT_FIXED_TICKS,
    };

    logging::init_with_level(&config.log_level);
    log::info!(
        "Octree sandbox: {:?} broad phase, {} fixed ticks",
        config.physics.broad_phase,
        fixed_ticks
    );

    let mut engine = Engine::new(&config.timing)?;
    engine.add_application(PhysicsApp::new(
        config.physics.clone(),
        config.scene.clone(),
        Some(fixed_ticks),
    ));

    // Frames slightly longer than a fixed step, so almost every frame runs one tick
    let frame_delta = config.timing.fixed_delta_time * 1.01;
    let frames = engine.run_frames(fixed_ticks.saturating_mul(2), frame_delta)?;
    log::info!("Ran {frames} frames");
    Ok(())
}
