#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives headless Shadowgrid sessions.

mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use shadowgrid_core::{Command, Direction, Event, Positionable, SessionStatus, ShadowKind};
use shadowgrid_system_level_generation::CaveGenerator;
use shadowgrid_system_pathfinding::Pathfinder;
use shadowgrid_world::{self as world, query, SessionConfig, World};

const MAX_CAVE_SIDE: u32 = 1_024;

#[derive(Debug, Parser)]
#[command(name = "shadowgrid", version, about = "Headless driver for Shadowgrid sessions")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Plays a session with the autopilot and prints a summary.
    Run(RunArgs),
    /// Generates a single cave and prints it.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Seed for the session random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML file with session tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Level to start on, overriding the configuration.
    #[arg(long)]
    level: Option<u32>,
    /// Maximum number of simulation ticks.
    #[arg(long, default_value_t = 2_000)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Ticks between two autopilot scans.
    #[arg(long, default_value_t = 10)]
    scan_every: u32,
    /// Prints the summary as JSON.
    #[arg(long)]
    json: bool,
    /// Prints the final map.
    #[arg(long)]
    show_map: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Seed for the generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Map width in tiles.
    #[arg(long, default_value_t = 18)]
    width: u32,
    /// Map height in tiles.
    #[arg(long, default_value_t = 18)]
    height: u32,
    /// Chance that an interior cell starts as a wall.
    #[arg(long, default_value_t = 0.38)]
    wall_probability: f64,
    /// Number of smoothing rounds.
    #[arg(long, default_value_t = 3)]
    iterations: u32,
}

/// Aggregated outcome of an autopilot run.
#[derive(Debug, Default, Serialize)]
struct RunReport {
    seed: u64,
    status: Option<SessionStatus>,
    level: u32,
    levels_completed: Vec<u32>,
    ticks: u32,
    elapsed_ms: u128,
    resources: u32,
    resources_collected: u32,
    tiles_revealed: usize,
    enemies_defeated: u32,
    shadows_summoned: u32,
    shadows_lost: u32,
    traps_triggered: u32,
}

impl RunReport {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.elapsed_ms += dt.as_millis(),
                Event::LevelCompleted { level } => self.levels_completed.push(*level),
                Event::ResourceCollected { .. } => self.resources_collected += 1,
                Event::TilesRevealed { cells } => self.tiles_revealed += cells.len(),
                Event::EnemyDefeated { .. } => self.enemies_defeated += 1,
                Event::ShadowSummoned { .. } => self.shadows_summoned += 1,
                Event::ShadowDefeated { .. } => self.shadows_lost += 1,
                Event::TrapTriggered { .. } => self.traps_triggered += 1,
                _ => {}
            }
        }
    }
}

/// Scripted player that walks the cheapest route to the exit.
#[derive(Debug)]
struct Autopilot {
    pathfinder: Pathfinder,
    scan_every: u32,
}

impl Autopilot {
    fn new(scan_every: u32) -> Self {
        Self {
            pathfinder: Pathfinder::new(),
            scan_every: scan_every.max(1),
        }
    }

    fn plan(&mut self, world: &World, tick: u32, out: &mut Vec<Command>) {
        if tick % self.scan_every == 0 {
            out.push(Command::Scan { animated: true });
        }

        let player = query::player(world);
        let threatened = query::enemies(world)
            .iter()
            .any(|enemy| enemy.cell().manhattan_distance(player.cell()) < enemy.detection_range());
        if threatened
            && query::shadows(world).is_empty()
            && player.resources() >= ShadowKind::Shadow.profile().cost
        {
            out.push(Command::SummonShadow {
                kind: ShadowKind::Shadow,
            });
            out.push(Command::ToggleShadowAttack);
        }

        let path = self
            .pathfinder
            .find_path(player.cell(), query::exit(world), query::grid(world));
        if let Some(direction) = path
            .first()
            .and_then(|next| Direction::between(player.cell(), *next))
        {
            out.push(Command::MovePlayer { direction });
        }
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load session config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(level) = args.level {
        config.start_level = level;
    }
    config.validate().context("invalid session options")?;
    ensure!(args.tick_ms > 0, "tick duration must be positive");

    let dt = Duration::from_millis(args.tick_ms);
    let mut world = World::new(config, args.seed);
    let mut autopilot = Autopilot::new(args.scan_every);
    let mut report = RunReport {
        seed: args.seed,
        ..RunReport::default()
    };
    info!("{}", query::welcome_banner(&world));

    let mut commands = Vec::new();
    let mut events = Vec::new();
    for tick in 0..args.ticks {
        if query::status(&world) != SessionStatus::Playing {
            break;
        }
        autopilot.plan(&world, tick, &mut commands);
        commands.push(Command::Tick { dt });
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        report.record(&events);
        events.clear();
        report.ticks = tick + 1;
    }
    debug!("run finished after {} ticks", report.ticks);

    report.status = Some(query::status(&world));
    report.level = query::level(&world);
    report.resources = query::player(&world).resources();

    if args.show_map {
        print!("{}", render::session(&world));
    }
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode run report")?;
        println!("{json}");
    } else {
        println!(
            "seed {}: {:?} on level {} after {} ticks ({} ms)",
            report.seed,
            query::status(&world),
            report.level,
            report.ticks,
            report.elapsed_ms
        );
        println!(
            "levels completed {:?}, resources {} ({} collected), \
             enemies defeated {}, traps triggered {}",
            report.levels_completed,
            report.resources,
            report.resources_collected,
            report.enemies_defeated,
            report.traps_triggered
        );
    }
    Ok(())
}

fn generate(args: &GenerateArgs) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&args.wall_probability),
        "wall probability must lie in [0, 1], got {}",
        args.wall_probability
    );
    ensure!(
        args.width >= 3 && args.height >= 3,
        "a cave needs at least 3x3 tiles, got {}x{}",
        args.width,
        args.height
    );
    ensure!(
        args.width <= MAX_CAVE_SIDE && args.height <= MAX_CAVE_SIDE,
        "a cave side may not exceed {MAX_CAVE_SIDE} tiles, got {}x{}",
        args.width,
        args.height
    );

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let layout = CaveGenerator::new(args.width, args.height).generate(
        &mut rng,
        args.wall_probability,
        args.iterations,
    );
    print!("{}", render::walls(layout.walls()));
    println!("floor region: {} cells", layout.largest_region().len());
    Ok(())
}

/// Entry point for the Shadowgrid command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match &cli.command {
        CliCommand::Run(args) => run(args),
        CliCommand::Generate(args) => generate(args),
    }
}
