#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Shadowgrid.
//!
//! The [`World`] owns the grid, the player, the enemy and shadow lists and the
//! seeded random source. Callers drive it exclusively through [`apply`] and
//! read it through the [`query`] module.

pub mod config;
mod spawn;

use std::time::Duration;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shadowgrid_core::{
    BuildError, CellCoord, Command, Damageable, Direction, EnemyId, Event, Grid, LevelConfig,
    Movable, Positionable, SessionStatus, ShadowId, ShadowKind, TileKind, TrapKind, TrapState,
    WALL_BUILD_COST, WELCOME_BANNER,
};
use shadowgrid_system_enemy_ai::Enemy;
use shadowgrid_system_pathfinding::{Pathfinder, RevealWave};
use shadowgrid_system_shadow_ai::Shadow;

pub use config::{ConfigError, SessionConfig};

/// The player avatar: a position and a resource purse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    cell: CellCoord,
    resources: u32,
}

impl Player {
    /// Resources available for building and summoning.
    #[must_use]
    pub const fn resources(&self) -> u32 {
        self.resources
    }

    fn spend(&mut self, amount: u32) -> Result<(), BuildError> {
        if self.resources < amount {
            return Err(BuildError::InsufficientResources);
        }
        self.resources -= amount;
        Ok(())
    }
}

impl Positionable for Player {
    fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Represents the authoritative Shadowgrid session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SessionConfig,
    rng: ChaCha8Rng,
    level: u32,
    status: SessionStatus,
    grid: Grid,
    player: Player,
    exit: CellCoord,
    enemies: Vec<Enemy>,
    shadows: Vec<Shadow>,
    pathfinder: Pathfinder,
    reveal: Option<RevealWave>,
    next_enemy_id: u32,
    next_shadow_id: u32,
    level_time: Duration,
    tick_index: u64,
    pending: Vec<Event>,
}

impl World {
    /// Creates a session on the configured start level, seeded for replay.
    ///
    /// The events describing the opening level are delivered together with
    /// the output of the first [`apply`] call.
    #[must_use]
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        let level = if LevelConfig::for_level(config.start_level).is_some() {
            config.start_level
        } else {
            1
        };
        let mut world = Self {
            banner: WELCOME_BANNER,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            level,
            status: SessionStatus::Playing,
            grid: Grid::new(0, 0),
            player: Player {
                cell: CellCoord::new(0, 0),
                resources: 0,
            },
            exit: CellCoord::new(0, 0),
            enemies: Vec::new(),
            shadows: Vec::new(),
            pathfinder: Pathfinder::new(),
            reveal: None,
            next_enemy_id: 0,
            next_shadow_id: 0,
            level_time: Duration::ZERO,
            tick_index: 0,
            pending: Vec::new(),
        };
        let mut opening = Vec::new();
        world.start_level(level, &mut opening);
        world.pending = opening;
        world
    }

    fn start_level(&mut self, level: u32, out: &mut Vec<Event>) {
        let level_config = LevelConfig::for_level(level).unwrap_or_else(LevelConfig::first);
        let layout = spawn::build_level(&self.config, &level_config, &mut self.rng);

        self.level = level;
        self.grid = layout.grid;
        self.player = Player {
            cell: layout.spawn,
            resources: level_config.start_resources,
        };
        self.exit = layout.exit;
        self.shadows.clear();
        self.reveal = None;
        self.level_time = Duration::ZERO;

        self.enemies = Vec::with_capacity(layout.enemies.len());
        for (kind, cell) in layout.enemies {
            let id = EnemyId::new(self.next_enemy_id);
            self.next_enemy_id += 1;
            self.enemies.push(Enemy::spawn(id, kind, cell, &mut self.rng));
        }

        info!(
            "level {level} started on a {}x{} map, spawn {:?}, exit {:?}, {} enemies",
            self.grid.width(),
            self.grid.height(),
            layout.spawn,
            layout.exit,
            self.enemies.len()
        );
        out.push(Event::LevelStarted {
            level,
            width: self.grid.width(),
            height: self.grid.height(),
            spawn: layout.spawn,
            exit: layout.exit,
        });

        let cells = self
            .pathfinder
            .scan(self.player.cell, &self.grid, self.config.scan_radius);
        self.reveal_cells(cells, out);
    }

    fn reveal_cells(&mut self, cells: Vec<CellCoord>, out: &mut Vec<Event>) {
        let revealed = self.grid.reveal(cells);
        if !revealed.is_empty() {
            out.push(Event::TilesRevealed { cells: revealed });
        }
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out.push(Event::TimeAdvanced { dt });
        if self.status != SessionStatus::Playing {
            return;
        }
        self.level_time = self.level_time.saturating_add(dt);

        if self.update_enemies(dt, out) {
            return;
        }
        self.trigger_traps(out);
        self.grid.tick_traps(dt);
        self.advance_reveal(dt, out);

        for shadow in &mut self.shadows {
            shadow.update(
                dt,
                self.player.cell,
                &mut self.enemies,
                &self.grid,
                &mut self.pathfinder,
                out,
            );
        }

        self.remove_dead(out);

        if self.player.cell == self.exit {
            self.complete_level(out);
        }
    }

    /// Runs every enemy for one tick; returns `true` once the player is caught.
    fn update_enemies(&mut self, dt: Duration, out: &mut Vec<Event>) -> bool {
        let player = self.player.cell;
        for enemy in &mut self.enemies {
            enemy.update(dt, player, &self.grid, &mut self.pathfinder, out);

            let from = enemy.cell();
            if let Some(to) = enemy.move_step(dt) {
                out.push(Event::EnemyAdvanced {
                    enemy: enemy.id(),
                    from,
                    to,
                });
            }

            let reach = enemy.cell();
            if let Some(shadow) = self
                .shadows
                .iter_mut()
                .find(|shadow| !shadow.is_dead() && reach.manhattan_distance(shadow.cell()) <= 1)
            {
                if let Some(damage) = enemy.try_attack(shadow.cell()) {
                    let damage = shadow.take_damage(damage);
                    out.push(Event::EnemyAttacked {
                        enemy: enemy.id(),
                        shadow: shadow.id(),
                        damage,
                    });
                }
            }

            if enemy.check_caught_target(player) {
                info!("player caught by enemy {} on level {}", enemy.id().get(), self.level);
                self.status = SessionStatus::Caught;
                out.push(Event::PlayerCaught { enemy: enemy.id() });
                return true;
            }
        }
        false
    }

    fn trigger_traps(&mut self, out: &mut Vec<Event>) {
        for enemy in &mut self.enemies {
            if enemy.is_dead() {
                continue;
            }
            let cell = enemy.cell();
            let Some(trap) = self.grid.tile_mut(cell).and_then(|tile| tile.trigger_trap()) else {
                continue;
            };
            let spec = trap.spec();
            let damage = if spec.damage > 0 {
                enemy.take_damage(spec.damage)
            } else {
                0
            };
            if let Some((effect, duration)) = spec.effect {
                enemy.apply_effect(effect, duration);
            }
            debug!("{trap:?} trap at {cell:?} hit enemy {} for {damage}", enemy.id().get());
            out.push(Event::TrapTriggered {
                cell,
                trap,
                enemy: enemy.id(),
                damage,
            });
        }
    }

    fn advance_reveal(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let Some(wave) = self.reveal.as_mut() else {
            return;
        };
        let mut cells = Vec::new();
        wave.advance(dt, &mut cells);
        if wave.is_finished() {
            self.reveal = None;
        }
        self.reveal_cells(cells, out);
    }

    fn remove_dead(&mut self, out: &mut Vec<Event>) {
        self.enemies.retain(|enemy| {
            let alive = !enemy.is_dead();
            if !alive {
                out.push(Event::EnemyDefeated { enemy: enemy.id() });
            }
            alive
        });
        self.shadows.retain(|shadow| {
            let alive = !shadow.is_dead();
            if !alive {
                out.push(Event::ShadowDefeated { shadow: shadow.id() });
            }
            alive
        });
    }

    fn complete_level(&mut self, out: &mut Vec<Event>) {
        info!("level {} completed in {:?}", self.level, self.level_time);
        out.push(Event::LevelCompleted { level: self.level });

        let next = self.level + 1;
        if LevelConfig::for_level(next).is_some() {
            self.start_level(next, out);
        } else {
            info!("campaign completed");
            self.status = SessionStatus::Victory;
            out.push(Event::CampaignCompleted);
        }
    }

    fn move_player(&mut self, direction: Direction, out: &mut Vec<Event>) {
        if self.status != SessionStatus::Playing {
            return;
        }
        let from = self.player.cell;
        let to = from.step(direction);
        if !self.grid.is_passable(to) {
            debug!("player blocked moving {direction:?} from {from:?}");
            return;
        }
        self.player.cell = to;
        out.push(Event::PlayerMoved { from, to });

        let on_resource = self
            .grid
            .tile(to)
            .is_some_and(|tile| tile.kind() == TileKind::Resource);
        if on_resource && self.grid.set_kind(to, TileKind::Floor) {
            self.player.resources = self
                .player
                .resources
                .saturating_add(self.config.resource_value);
            out.push(Event::ResourceCollected {
                cell: to,
                total: self.player.resources,
            });
        }
    }

    fn scan(&mut self, animated: bool, out: &mut Vec<Event>) {
        let layers = self
            .pathfinder
            .scan_layers(self.player.cell, &self.grid, self.config.scan_radius);
        if animated {
            let mut wave = RevealWave::new(layers, self.config.reveal_interval());
            let first = wave.next_layer().unwrap_or_default();
            self.reveal = (!wave.is_finished()).then_some(wave);
            self.reveal_cells(first, out);
        } else {
            self.reveal = None;
            self.reveal_cells(layers.into_iter().flatten().collect(), out);
        }
    }

    fn build(&mut self, kind: TileKind, cost: u32) -> Result<CellCoord, BuildError> {
        if self.status != SessionStatus::Playing {
            return Err(BuildError::InvalidMode);
        }
        let cell = self.player.cell;
        let is_floor = self
            .grid
            .tile(cell)
            .is_some_and(|tile| tile.kind() == TileKind::Floor);
        if !is_floor {
            return Err(BuildError::TileUnavailable);
        }
        self.player.spend(cost)?;
        let _ = self.grid.set_kind(cell, kind);
        Ok(cell)
    }

    fn summon(&mut self, kind: ShadowKind) -> Result<Shadow, BuildError> {
        if self.status != SessionStatus::Playing {
            return Err(BuildError::InvalidMode);
        }
        self.player.spend(kind.profile().cost)?;
        let id = ShadowId::new(self.next_shadow_id);
        self.next_shadow_id += 1;
        Ok(Shadow::new(id, kind, self.player.cell))
    }

    fn dismiss(&mut self) -> Result<(ShadowId, u32), BuildError> {
        if self.status != SessionStatus::Playing {
            return Err(BuildError::InvalidMode);
        }
        let shadow = self.shadows.pop().ok_or(BuildError::NoShadow)?;
        let refund = shadow.refund();
        self.player.resources = self.player.resources.saturating_add(refund);
        Ok((shadow.id(), refund))
    }
}

fn report_build(result: Result<CellCoord, BuildError>, kind: TileKind, out: &mut Vec<Event>) {
    match result {
        Ok(cell) => out.push(Event::TileBuilt { cell, kind }),
        Err(reason) => out.push(Event::BuildRejected { reason }),
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    out_events.append(&mut world.pending);

    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::Scan { animated } => world.scan(animated, out_events),
        Command::BuildWall => {
            let result = world.build(TileKind::Wall, WALL_BUILD_COST);
            report_build(result, TileKind::Wall, out_events);
        }
        Command::BuildTrap { kind } => {
            let tile = TileKind::Trap(TrapState::armed(kind));
            let result = world.build(tile, trap_cost(kind));
            report_build(result, tile, out_events);
        }
        Command::SummonShadow { kind } => match world.summon(kind) {
            Ok(shadow) => {
                out_events.push(Event::ShadowSummoned {
                    shadow: shadow.id(),
                    kind,
                    cell: shadow.cell(),
                });
                world.shadows.push(shadow);
            }
            Err(reason) => out_events.push(Event::BuildRejected { reason }),
        },
        Command::DismissShadow => match world.dismiss() {
            Ok((shadow, refund)) => out_events.push(Event::ShadowDismissed { shadow, refund }),
            Err(reason) => out_events.push(Event::BuildRejected { reason }),
        },
        Command::ToggleShadowAttack => {
            for shadow in &mut world.shadows {
                shadow.toggle(out_events);
            }
        }
    }
}

const fn trap_cost(kind: TrapKind) -> u32 {
    kind.spec().cost
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Player, World};
    use shadowgrid_core::{CellCoord, Grid, SessionStatus};
    use shadowgrid_system_enemy_ai::Enemy;
    use shadowgrid_system_shadow_ai::Shadow;

    use crate::config::SessionConfig;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// One-based number of the level being played.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Overall outcome of the session so far.
    #[must_use]
    pub fn status(world: &World) -> SessionStatus {
        world.status
    }

    /// Provides read-only access to the tile grid of the current level.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// The player avatar.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Cell the player must reach to finish the level.
    #[must_use]
    pub fn exit(world: &World) -> CellCoord {
        world.exit
    }

    /// Living enemies in update order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Summoned shadows in summon order.
    #[must_use]
    pub fn shadows(world: &World) -> &[Shadow] {
        &world.shadows
    }

    /// Simulated time spent on the current level.
    #[must_use]
    pub fn level_time(world: &World) -> Duration {
        world.level_time
    }

    /// Number of ticks processed since the session started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether an animated reveal is still releasing rings.
    #[must_use]
    pub fn reveal_in_progress(world: &World) -> bool {
        world.reveal.is_some()
    }
}
