#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Companion behaviour for summoned shadows.
//!
//! Shadows follow the player while idle and hunt the nearest living enemy in
//! attack mode. The mode only changes on command; detection never flips it.

use std::{collections::VecDeque, time::Duration};

use log::debug;
use shadowgrid_core::{
    CellCoord, CombatStats, Damageable, EnemyId, Event, Grid, Movable, MovementState, Positionable,
    ShadowId, ShadowKind, ShadowState,
};
use shadowgrid_system_enemy_ai::Enemy;
use shadowgrid_system_pathfinding::Pathfinder;

/// Distance a following shadow may trail behind the player.
pub const LEASH_DISTANCE: u32 = 2;

/// Minimum time between two shadow attacks.
pub const ATTACK_COOLDOWN: Duration = Duration::from_millis(300);

/// Allied agent summoned by the player.
#[derive(Clone, Debug)]
pub struct Shadow {
    id: ShadowId,
    kind: ShadowKind,
    cell: CellCoord,
    state: ShadowState,
    target_enemy: Option<EnemyId>,
    stats: CombatStats,
    movement: MovementState,
    attack_cooldown: Duration,
}

impl Shadow {
    /// Summons an idle shadow of the provided kind on `cell`.
    #[must_use]
    pub fn new(id: ShadowId, kind: ShadowKind, cell: CellCoord) -> Self {
        let profile = kind.profile();
        Self {
            id,
            kind,
            cell,
            state: ShadowState::Idle,
            target_enemy: None,
            stats: CombatStats::new(profile.health, 0, profile.damage),
            movement: MovementState::new(profile.move_interval),
            attack_cooldown: Duration::ZERO,
        }
    }

    /// Identifier of the shadow.
    #[must_use]
    pub const fn id(&self) -> ShadowId {
        self.id
    }

    /// Catalogue kind of the shadow.
    #[must_use]
    pub const fn kind(&self) -> ShadowKind {
        self.kind
    }

    /// Current behavioural state.
    #[must_use]
    pub const fn state(&self) -> ShadowState {
        self.state
    }

    /// Enemy selected on the latest attack tick, if any.
    #[must_use]
    pub const fn target_enemy(&self) -> Option<EnemyId> {
        self.target_enemy
    }

    /// Combat statistics of the shadow.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Resources refunded when the shadow is dismissed.
    #[must_use]
    pub const fn refund(&self) -> u32 {
        self.kind.profile().cost
    }

    /// Switches the behavioural state, dropping any target and path on change.
    pub fn set_state(&mut self, state: ShadowState, out: &mut Vec<Event>) {
        if self.state == state {
            return;
        }
        debug!("shadow {} {:?} -> {:?}", self.id.get(), self.state, state);
        self.state = state;
        self.target_enemy = None;
        self.movement.clear_path();
        out.push(Event::ShadowStateChanged {
            shadow: self.id,
            state,
        });
    }

    /// Flips between following and attacking.
    pub fn toggle(&mut self, out: &mut Vec<Event>) {
        self.set_state(self.state.toggled(), out);
    }

    /// Runs one tick of behaviour and movement.
    ///
    /// Attacks land directly on the targeted enemy; removing enemies that
    /// died is left to the caller.
    pub fn update(
        &mut self,
        dt: Duration,
        player: CellCoord,
        enemies: &mut [Enemy],
        grid: &Grid,
        pathfinder: &mut Pathfinder,
        out: &mut Vec<Event>,
    ) {
        if self.stats.is_dead() {
            return;
        }
        self.attack_cooldown = self.attack_cooldown.saturating_sub(dt);

        match self.state {
            ShadowState::Idle => self.follow(player, grid, pathfinder),
            ShadowState::Attack => self.engage(enemies, grid, pathfinder, out),
        }

        let from = self.cell;
        if let Some(to) = self.move_step(dt) {
            out.push(Event::ShadowAdvanced {
                shadow: self.id,
                from,
                to,
            });
        }
    }

    fn follow(&mut self, player: CellCoord, grid: &Grid, pathfinder: &mut Pathfinder) {
        if self.cell.manhattan_distance(player) > LEASH_DISTANCE {
            self.movement
                .replace_path(pathfinder.find_path(self.cell, player, grid));
        } else {
            self.movement.clear_path();
        }
    }

    fn engage(
        &mut self,
        enemies: &mut [Enemy],
        grid: &Grid,
        pathfinder: &mut Pathfinder,
        out: &mut Vec<Event>,
    ) {
        let cell = self.cell;
        let Some(target) = enemies
            .iter_mut()
            .filter(|enemy| !enemy.is_dead())
            .min_by_key(|enemy| cell.manhattan_distance(enemy.cell()))
        else {
            self.set_state(ShadowState::Idle, out);
            return;
        };
        self.target_enemy = Some(target.id());

        if !self.attack_cooldown.is_zero() {
            return;
        }
        let target_cell = target.cell();
        if cell.manhattan_distance(target_cell) <= 1 {
            let damage = target.take_damage(self.stats.damage());
            self.attack_cooldown = ATTACK_COOLDOWN;
            self.movement.clear_path();
            out.push(Event::ShadowAttacked {
                shadow: self.id,
                enemy: target.id(),
                damage,
            });
        } else {
            self.movement
                .replace_path(pathfinder.find_path(cell, target_cell, grid));
        }
    }
}

impl Positionable for Shadow {
    fn cell(&self) -> CellCoord {
        self.cell
    }
}

impl Damageable for Shadow {
    fn take_damage(&mut self, amount: u32) -> u32 {
        self.stats.take_damage(amount)
    }

    fn health(&self) -> u32 {
        self.stats.health()
    }
}

impl Movable for Shadow {
    fn path(&self) -> &VecDeque<CellCoord> {
        self.movement.path()
    }

    fn move_interval(&self) -> Duration {
        self.movement.interval()
    }

    fn move_step(&mut self, dt: Duration) -> Option<CellCoord> {
        if self.stats.is_dead() {
            return None;
        }
        self.movement.advance(&mut self.cell, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowgrid_core::EnemyKind;
    use shadowgrid_system_enemy_ai::PatrolRoute;

    fn enemy_at(id: u32, cell: CellCoord) -> Enemy {
        Enemy::new(
            EnemyId::new(id),
            EnemyKind::SecurityAgent,
            cell,
            PatrolRoute::new(vec![cell]),
        )
    }

    #[test]
    fn toggle_announces_each_change() {
        let mut shadow = Shadow::new(ShadowId::new(0), ShadowKind::Igris, CellCoord::new(1, 1));
        let mut events = Vec::new();
        shadow.toggle(&mut events);
        shadow.set_state(ShadowState::Attack, &mut events);
        shadow.toggle(&mut events);
        assert_eq!(
            events,
            vec![
                Event::ShadowStateChanged {
                    shadow: ShadowId::new(0),
                    state: ShadowState::Attack,
                },
                Event::ShadowStateChanged {
                    shadow: ShadowId::new(0),
                    state: ShadowState::Idle,
                },
            ]
        );
    }

    #[test]
    fn adjacent_enemy_is_struck_instead_of_approached() {
        let grid = Grid::new(6, 6);
        let mut pathfinder = Pathfinder::new();
        let mut shadow = Shadow::new(ShadowId::new(1), ShadowKind::Beru, CellCoord::new(2, 2));
        let mut enemies = vec![enemy_at(4, CellCoord::new(3, 2))];
        let mut events = Vec::new();
        shadow.toggle(&mut events);
        events.clear();

        shadow.update(
            Duration::from_millis(100),
            CellCoord::new(0, 0),
            &mut enemies,
            &grid,
            &mut pathfinder,
            &mut events,
        );

        assert_eq!(shadow.cell(), CellCoord::new(2, 2));
        assert_eq!(shadow.target_enemy(), Some(EnemyId::new(4)));
        assert_eq!(enemies[0].health(), 10);
        assert_eq!(
            events,
            vec![Event::ShadowAttacked {
                shadow: ShadowId::new(1),
                enemy: EnemyId::new(4),
                damage: 20,
            }]
        );
    }
}
