//! # ecs_demo
//!
//! Populates an engine with moving entities and map tiles, registers the
//! demo systems, runs the tick loop and prints the resulting state.
//!
//! ## Startup Sequence
//!
//! 1. Register the five demo systems in execution order.
//! 2. Spawn movers and tiles with `notify = false`, then refresh every system
//!    once with `notify_entity_change`.
//! 3. Run the tick loop (back to back for one second by default).
//! 4. Print the tick report and dump the first entities.

mod systems;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use components::{Frozen, Identifier, IdentifierSequence, MapTile, Position, Velocity};
use ecs_component::Entity;
use ecs_engine::{Engine, TickConfig, TickLoop, TickReport};
use systems::{
    FrictionSystem, IdentifierStampSystem, MovementSystem, PositionRounderSystem,
    TileUpdateSystem,
};

#[derive(Parser)]
#[command(name = "ecs_demo", about = "Run the ECS demo systems over a populated engine")]
struct Args {
    /// Number of entities with a position and a velocity
    #[arg(long, default_value_t = 100)]
    movers: usize,

    /// Number of map tile entities
    #[arg(long, default_value_t = 10_000)]
    tiles: usize,

    /// Wall-clock budget in seconds (ignored when --config is given)
    #[arg(long, default_value_t = 1.0)]
    duration_secs: f64,

    /// Stop after this many ticks (0 = no limit; ignored when --config is given)
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,

    /// Target tick rate (0 = back to back; ignored when --config is given)
    #[arg(long, default_value_t = 0.0)]
    tick_rate: f64,

    /// JSON file holding a tick loop configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random initial state
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of entities to dump after the run
    #[arg(long, default_value_t = 5)]
    dump: usize,

    /// Print the report and the dump as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn tick_config(&self) -> Result<TickConfig> {
        let config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading tick config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing tick config {}", path.display()))?
            }
            None => TickConfig {
                tick_rate: self.tick_rate,
                max_ticks: self.max_ticks,
                max_duration_secs: self.duration_secs,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Read-back view of one entity's demo components.
#[derive(Debug, Serialize)]
struct EntitySnapshot {
    id: String,
    position: Option<Position>,
    velocity: Option<Velocity>,
    identifier: Option<Identifier>,
    map_tile: Option<MapTile>,
    frozen: bool,
}

impl EntitySnapshot {
    fn capture(entity: &Entity) -> Self {
        Self {
            id: entity.id().to_string(),
            position: entity.get::<Position>().ok().copied(),
            velocity: entity.get::<Velocity>().ok().copied(),
            identifier: entity.get::<Identifier>().ok().copied(),
            map_tile: entity.get::<MapTile>().ok().copied(),
            frozen: entity.contains::<Frozen>(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunOutput {
    report: TickReport,
    entities: Vec<EntitySnapshot>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecs_demo=info".parse()?))
        .init();

    let args = Args::parse();
    let config = args.tick_config()?;

    let mut engine = Engine::new()
        .with_system(MovementSystem::new())
        .with_system(IdentifierStampSystem::new())
        .with_system(PositionRounderSystem::new())
        .with_system(FrictionSystem::new())
        .with_system(TileUpdateSystem::new());

    populate(&mut engine, &args)?;
    engine.notify_entity_change();
    info!(
        entities = engine.world().len(),
        systems = ?engine.system_names(),
        "engine populated"
    );

    let report = TickLoop::new(config).run(&mut engine)?;

    let entities: Vec<_> = engine
        .entities()
        .take(args.dump)
        .map(EntitySnapshot::capture)
        .collect();

    if args.json {
        let output = RunOutput { report, entities };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} ticks in {:.3}s ({:.1} ticks/s, {:.2} frames at 60 Hz)",
            report.ticks,
            report.elapsed_secs,
            report.ticks_per_second,
            report.ticks as f64 / 60.0
        );
        for snapshot in &entities {
            println!("{snapshot:?}");
        }
    }

    Ok(())
}

/// Spawn the movers and tiles without notifying; the caller refreshes the
/// systems once afterwards.
fn populate(engine: &mut Engine, args: &Args) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut ids = IdentifierSequence::new();

    for _ in 0..args.movers {
        let entity = Entity::new()
            .with(ids.next_identifier().context("identifier space exhausted")?)
            .with(Position::new(
                rng.gen_range(-100..=100) as f32,
                rng.gen_range(-100..=100) as f32,
            ))
            .with(random_velocity(&mut rng));
        engine.add_entity(entity, false);
    }

    for _ in 0..args.tiles {
        let entity = Entity::new()
            .with(MapTile::default())
            .with(random_velocity(&mut rng));
        engine.add_entity(entity, false);
    }

    info!(
        movers = args.movers,
        tiles = args.tiles,
        identifiers = ids.issued(),
        "spawned entities"
    );
    Ok(())
}

fn random_velocity(rng: &mut StdRng) -> Velocity {
    Velocity::new(f32::from(rng.r#gen::<u8>()), f32::from(rng.r#gen::<u8>()))
}
