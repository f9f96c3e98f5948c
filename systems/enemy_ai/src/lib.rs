#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour: patrol routes, target detection, hunting and status effects.
//!
//! An [`Enemy`] is driven in two phases per tick. [`Enemy::update`] evaluates
//! the state machine and refreshes the path, then [`Movable::move_step`]
//! counts down status effects and walks the path. Both are synchronous; the
//! caller owns the enemy list and removes dead enemies.

use std::{collections::VecDeque, time::Duration};

use log::debug;
use rand::Rng;
use shadowgrid_core::{
    CellCoord, CombatStats, Damageable, EffectKind, EnemyId, EnemyKind, EnemyState, Event, Grid,
    Movable, MovementState, Positionable,
};
use shadowgrid_system_pathfinding::Pathfinder;

/// Time an enemy lingers on a patrol point before heading to the next one.
pub const PATROL_DWELL: Duration = Duration::from_millis(1500);

/// Minimum time between two enemy attacks.
pub const ATTACK_COOLDOWN: Duration = Duration::from_secs(1);

/// Largest offset, per axis, between home and a generated patrol point.
pub const PATROL_RADIUS: i32 = 4;

/// Multiplier applied to the movement delta while slowed.
pub const SLOW_FACTOR: f64 = 0.5;

/// Cyclic list of waypoints walked while no target is detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatrolRoute {
    points: Vec<CellCoord>,
    index: usize,
}

impl PatrolRoute {
    /// Creates a route over explicit points, starting at the first one.
    #[must_use]
    pub fn new(points: Vec<CellCoord>) -> Self {
        Self { points, index: 0 }
    }

    /// Generates a route around `home`.
    ///
    /// Home is always the first point, followed by two or three random
    /// offsets within [`PATROL_RADIUS`] on each axis. Offsets landing on an
    /// already chosen point are dropped, so the route may be shorter.
    /// Points are not checked against the grid.
    pub fn generate<R>(home: CellCoord, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut points = vec![home];
        let extra = rng.gen_range(2..=3);
        for _ in 0..extra {
            let candidate = CellCoord::new(
                home.column() + rng.gen_range(-PATROL_RADIUS..=PATROL_RADIUS),
                home.row() + rng.gen_range(-PATROL_RADIUS..=PATROL_RADIUS),
            );
            if !points.contains(&candidate) {
                points.push(candidate);
            }
        }
        Self::new(points)
    }

    /// Waypoints in visiting order.
    #[must_use]
    pub fn points(&self) -> &[CellCoord] {
        &self.points
    }

    /// Index of the waypoint currently being walked to.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Waypoint currently being walked to.
    #[must_use]
    pub fn active(&self) -> Option<CellCoord> {
        self.points.get(self.index).copied()
    }

    /// Reports whether the route has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Moves on to the next waypoint, wrapping around at the end.
    pub fn advance(&mut self) {
        if !self.points.is_empty() {
            self.index = (self.index + 1) % self.points.len();
        }
    }
}

/// Freeze and slow countdowns applied by traps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusEffects {
    frozen_remaining: Duration,
    slow_remaining: Duration,
}

impl StatusEffects {
    /// Time left before a freeze wears off.
    #[must_use]
    pub const fn frozen_remaining(&self) -> Duration {
        self.frozen_remaining
    }

    /// Time left before a slow wears off.
    #[must_use]
    pub const fn slow_remaining(&self) -> Duration {
        self.slow_remaining
    }

    /// Reports whether the entity is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        !self.frozen_remaining.is_zero()
    }

    /// Reports whether the entity is slowed.
    #[must_use]
    pub const fn is_slowed(&self) -> bool {
        !self.slow_remaining.is_zero()
    }

    /// Starts an effect, overwriting any running effect of the same kind.
    pub fn apply(&mut self, kind: EffectKind, duration: Duration) {
        match kind {
            EffectKind::Freeze => self.frozen_remaining = duration,
            EffectKind::Slow => self.slow_remaining = duration,
        }
    }

    /// Counts the timers down and returns the delta movement may use.
    ///
    /// `None` means the entity is frozen for this tick.
    fn elapse(&mut self, dt: Duration) -> Option<Duration> {
        if self.is_frozen() {
            self.frozen_remaining = self.frozen_remaining.saturating_sub(dt);
            return None;
        }
        if self.is_slowed() {
            self.slow_remaining = self.slow_remaining.saturating_sub(dt);
            return Some(dt.mul_f64(SLOW_FACTOR));
        }
        Some(dt)
    }
}

/// Hostile agent that patrols its home and hunts the player on sight.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    cell: CellCoord,
    state: EnemyState,
    route: PatrolRoute,
    dwell: Option<Duration>,
    detection_range: u32,
    stats: CombatStats,
    movement: MovementState,
    effects: StatusEffects,
    attack_cooldown: Duration,
}

impl Enemy {
    /// Creates an enemy of the provided kind with an explicit patrol route.
    ///
    /// An empty route leaves the enemy idle until it detects a target.
    #[must_use]
    pub fn new(id: EnemyId, kind: EnemyKind, cell: CellCoord, route: PatrolRoute) -> Self {
        let profile = kind.profile();
        let state = if route.is_empty() {
            EnemyState::Idle
        } else {
            EnemyState::Patrol
        };
        Self {
            id,
            kind,
            cell,
            state,
            route,
            dwell: None,
            detection_range: profile.detection_range,
            stats: CombatStats::new(profile.health, profile.armor, profile.damage),
            movement: MovementState::new(profile.move_interval),
            effects: StatusEffects::default(),
            attack_cooldown: Duration::ZERO,
        }
    }

    /// Creates an enemy patrolling a freshly generated route around `cell`.
    pub fn spawn<R>(id: EnemyId, kind: EnemyKind, cell: CellCoord, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(id, kind, cell, PatrolRoute::generate(cell, rng))
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Catalogue kind of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current behavioural state.
    #[must_use]
    pub const fn state(&self) -> EnemyState {
        self.state
    }

    /// Patrol route walked outside of hunts.
    #[must_use]
    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    /// Manhattan distance below which the target is detected.
    #[must_use]
    pub const fn detection_range(&self) -> u32 {
        self.detection_range
    }

    /// Combat statistics of the enemy.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Running status effects.
    #[must_use]
    pub const fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    /// Time left before the enemy may attack again.
    #[must_use]
    pub const fn attack_cooldown(&self) -> Duration {
        self.attack_cooldown
    }

    /// Remaining dwell time on the current patrol point, if dwelling.
    #[must_use]
    pub const fn dwell_remaining(&self) -> Option<Duration> {
        self.dwell
    }

    /// Evaluates detection and patrol for one tick.
    ///
    /// A target closer than the detection range switches the enemy to
    /// hunting and refreshes the path to the target every tick. Losing the
    /// target drops the hunting path and resumes the patrol.
    pub fn update(
        &mut self,
        dt: Duration,
        target: CellCoord,
        grid: &Grid,
        pathfinder: &mut Pathfinder,
        out: &mut Vec<Event>,
    ) {
        if self.stats.is_dead() {
            return;
        }
        self.attack_cooldown = self.attack_cooldown.saturating_sub(dt);

        if self.cell.manhattan_distance(target) < self.detection_range {
            self.set_state(EnemyState::Hunting, out);
            self.movement
                .replace_path(pathfinder.find_path(self.cell, target, grid));
            return;
        }

        if self.state == EnemyState::Hunting {
            self.movement.clear_path();
            self.dwell = None;
        }
        self.update_patrol(grid, pathfinder, out);
    }

    /// Starts a status effect, overwriting a running effect of the same kind.
    pub fn apply_effect(&mut self, kind: EffectKind, duration: Duration) {
        debug!("enemy {} affected by {kind:?} for {duration:?}", self.id.get());
        self.effects.apply(kind, duration);
    }

    /// Reports whether the enemy stands on `cell` and is able to catch it.
    #[must_use]
    pub fn check_caught_target(&self, cell: CellCoord) -> bool {
        !self.stats.is_dead() && !self.effects.is_frozen() && self.cell == cell
    }

    /// Attacks a target on the same or an adjacent cell when the cooldown allows.
    ///
    /// Returns the raw damage to apply to the target.
    pub fn try_attack(&mut self, target: CellCoord) -> Option<u32> {
        if self.stats.is_dead()
            || self.effects.is_frozen()
            || !self.attack_cooldown.is_zero()
            || self.cell.manhattan_distance(target) > 1
        {
            return None;
        }
        self.attack_cooldown = ATTACK_COOLDOWN;
        Some(self.stats.damage())
    }

    fn update_patrol(&mut self, grid: &Grid, pathfinder: &mut Pathfinder, out: &mut Vec<Event>) {
        let Some(point) = self.route.active() else {
            self.set_state(EnemyState::Idle, out);
            return;
        };
        self.set_state(EnemyState::Patrol, out);

        if self.cell == point {
            match self.dwell {
                None => {
                    self.dwell = Some(PATROL_DWELL);
                    return;
                }
                Some(remaining) if !remaining.is_zero() => return,
                Some(_) => {
                    self.dwell = None;
                    self.route.advance();
                }
            }
        }

        if !self.movement.path().is_empty() {
            return;
        }
        let Some(point) = self.route.active() else {
            return;
        };
        if point == self.cell {
            return;
        }

        let path = if grid.is_passable(point) {
            pathfinder.find_path(self.cell, point, grid)
        } else {
            Vec::new()
        };
        if path.is_empty() {
            debug!(
                "enemy {} waiting on unreachable patrol point {point:?}",
                self.id.get()
            );
        } else {
            self.movement.replace_path(path);
        }
    }

    fn set_state(&mut self, state: EnemyState, out: &mut Vec<Event>) {
        if self.state == state {
            return;
        }
        debug!(
            "enemy {} {:?} -> {:?} at {:?}",
            self.id.get(),
            self.state,
            state,
            self.cell
        );
        out.push(Event::EnemyStateChanged {
            enemy: self.id,
            from: self.state,
            to: state,
        });
        self.state = state;
    }
}

impl Positionable for Enemy {
    fn cell(&self) -> CellCoord {
        self.cell
    }
}

impl Damageable for Enemy {
    fn take_damage(&mut self, amount: u32) -> u32 {
        self.stats.take_damage(amount)
    }

    fn health(&self) -> u32 {
        self.stats.health()
    }
}

impl Movable for Enemy {
    fn path(&self) -> &VecDeque<CellCoord> {
        self.movement.path()
    }

    fn move_interval(&self) -> Duration {
        self.movement.interval()
    }

    /// Counts down status effects and the patrol dwell, then walks the path.
    ///
    /// A frozen enemy never moves; a slowed one credits half of `dt`.
    fn move_step(&mut self, dt: Duration) -> Option<CellCoord> {
        if self.stats.is_dead() {
            return None;
        }
        let effective = self.effects.elapse(dt)?;
        if let Some(remaining) = self.dwell.as_mut() {
            *remaining = remaining.saturating_sub(effective);
        }
        self.movement.advance(&mut self.cell, effective)
    }
}
