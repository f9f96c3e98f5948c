//! Capability traits and composable state shared by every grid entity.

use std::{collections::VecDeque, time::Duration};

use crate::CellCoord;

/// Entity that occupies a single grid cell.
pub trait Positionable {
    /// Cell currently occupied by the entity.
    fn cell(&self) -> CellCoord;
}

/// Entity that can take damage and die.
pub trait Damageable {
    /// Applies damage and returns the amount actually dealt.
    fn take_damage(&mut self, amount: u32) -> u32;

    /// Remaining health points.
    fn health(&self) -> u32;

    /// Reports whether the entity has no health left.
    fn is_dead(&self) -> bool {
        self.health() == 0
    }
}

/// Entity that walks a path on the grid.
pub trait Movable {
    /// Cells still to be visited, front first.
    fn path(&self) -> &VecDeque<CellCoord>;

    /// Time the entity needs between successive steps.
    fn move_interval(&self) -> Duration;

    /// Credits elapsed time and takes at most one step, returning the new cell.
    fn move_step(&mut self, dt: Duration) -> Option<CellCoord>;
}

/// Health, armor and attack strength embedded in every combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatStats {
    max_health: u32,
    health: u32,
    armor: u32,
    damage: u32,
}

impl CombatStats {
    /// Creates stats at full health.
    #[must_use]
    pub const fn new(max_health: u32, armor: u32, damage: u32) -> Self {
        Self {
            max_health,
            health: max_health,
            armor,
            damage,
        }
    }

    /// Remaining health points.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Health points at full strength.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Flat reduction applied to every incoming hit.
    #[must_use]
    pub const fn armor(&self) -> u32 {
        self.armor
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Reports whether health reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Applies a hit reduced by armor; every hit deals at least one point.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.saturating_sub(self.armor).max(1);
        self.health = self.health.saturating_sub(actual);
        actual
    }

    /// Restores health up to the maximum, returning the amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }
}

/// Path queue plus the accumulate-then-step timer that paces movement.
///
/// Elapsed time is credited every tick; once the accumulator reaches the
/// interval and a path exists, the head of the path is popped, the entity
/// teleports onto it and the accumulator resets to zero. Movement speed is
/// therefore one tile per interval regardless of frame rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementState {
    path: VecDeque<CellCoord>,
    accumulator: Duration,
    interval: Duration,
}

impl MovementState {
    /// Creates an idle movement state with the provided step interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            path: VecDeque::new(),
            accumulator: Duration::ZERO,
            interval,
        }
    }

    /// Cells still to be visited, front first.
    #[must_use]
    pub fn path(&self) -> &VecDeque<CellCoord> {
        &self.path
    }

    /// Time required between successive steps.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time credited toward the next step.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Replaces the whole path.
    pub fn replace_path(&mut self, path: Vec<CellCoord>) {
        self.path = path.into();
    }

    /// Drops every queued step.
    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    /// Credits elapsed time toward the next step.
    pub fn accumulate(&mut self, dt: Duration) {
        self.accumulator = self.accumulator.saturating_add(dt);
    }

    /// Reports whether a step would be taken right now.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.accumulator >= self.interval && !self.path.is_empty()
    }

    /// Takes one step when ready, moving `position` and returning the new cell.
    pub fn try_step(&mut self, position: &mut CellCoord) -> Option<CellCoord> {
        if !self.ready() {
            return None;
        }
        let next = self.path.pop_front()?;
        *position = next;
        self.accumulator = Duration::ZERO;
        Some(next)
    }

    /// Credits `dt` and then attempts a single step.
    pub fn advance(&mut self, position: &mut CellCoord, dt: Duration) -> Option<CellCoord> {
        self.accumulate(dt);
        self.try_step(position)
    }
}
