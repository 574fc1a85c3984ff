//! Command-line runner for voxel physics scenarios.
//!
//! Loads a JSON scenario, ticks the physics service over it and logs where
//! every entity ended up.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use settle::{init_logging, EntityStore, GridWorld, PhysicsService, Scenario};

/// Runs a voxel scenario through the stuck-entity physics service
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file describing the world and its entities (JSON)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 60)]
    ticks: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scenario {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scenario = load_scenario(&args.scenario)?;
    let config = scenario.config.clone().unwrap_or_default();
    let mut world = GridWorld::from_scenario(&scenario);
    let mut service = PhysicsService::new(config).context("invalid physics configuration")?;

    for entity in world.entity_ids() {
        service.notify_created(entity);
    }
    for tick in 1..=args.ticks {
        service.update(&mut world, f64::from(tick));
    }

    for entity in world.entity_ids() {
        let moving = world.mob(entity).is_some_and(|mob| mob.in_free_motion);
        let placement = world.location(entity).and(world.position(entity)).map_or_else(
            || "not placed".to_owned(),
            |position| format!("{position} (in motion: {moving})"),
        );
        info!("{entity}: {placement}");
    }
    for entity in &world.destroyed {
        info!("{entity}: destroyed");
    }
    debug!("pools: {}", service.save_pools().to_json()?);
    Ok(())
}
