#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Shadowgrid engine.
//!
//! This crate defines the tile grid every other crate navigates, the entity
//! capabilities the AI systems are written against, the static catalogues of
//! enemies, shadows, traps and levels, and the message surface connecting the
//! session to its callers. Callers submit [`Command`] values, the session
//! executes them through its `apply` entry point and reports every observable
//! change as [`Event`] values.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod entity;
pub mod grid;

pub use catalog::{EnemyKind, EnemyProfile, LevelConfig, ShadowKind, ShadowProfile, WALL_BUILD_COST};
pub use entity::{CombatStats, Damageable, Movable, MovementState, Positionable};
pub use grid::{Grid, Tile, TileKind, TrapKind, TrapSpec, TrapState, WallMask};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Shadowgrid.";

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that patrol offsets and other derived positions
/// may fall outside the grid; the grid rejects such cells on lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the cell one step away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> CellCoord {
        match direction {
            Direction::North => Self::new(self.column, self.row - 1),
            Direction::East => Self::new(self.column + 1, self.row),
            Direction::South => Self::new(self.column, self.row + 1),
            Direction::West => Self::new(self.column - 1, self.row),
        }
    }

    /// The four orthogonal neighbours in expansion order: east, west, south, north.
    #[must_use]
    pub const fn neighbors(self) -> [CellCoord; 4] {
        [
            self.step(Direction::East),
            self.step(Direction::West),
            self.step(Direction::South),
            self.step(Direction::North),
        ]
    }
}

/// Cardinal movement directions available on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Direction that moves `from` onto the orthogonally adjacent `to`.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let delta = (to.column() - from.column(), to.row() - from.row());
        match delta {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a summoned shadow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShadowId(u32);

impl ShadowId {
    /// Creates a new shadow identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioural state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// No patrol route exists; the enemy stays put until it detects a target.
    Idle,
    /// Walking the cyclic patrol route.
    Patrol,
    /// Chasing the tracked target with a path refreshed every tick.
    Hunting,
}

/// Behavioural state of a shadow companion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowState {
    /// Follows the player and loiters within the leash distance.
    Idle,
    /// Hunts and engages the nearest living enemy.
    Attack,
}

impl ShadowState {
    /// Returns the opposite state, used by the attack toggle command.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Idle => Self::Attack,
            Self::Attack => Self::Idle,
        }
    }
}

/// Timed status effects that traps apply to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Suppresses all movement while the timer counts down.
    Freeze,
    /// Halves the time credited toward movement while the timer counts down.
    Slow,
}

/// Overall outcome of the running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The player is still navigating the current level.
    Playing,
    /// An enemy caught the player; the session is over.
    Caught,
    /// Every level in the catalogue has been cleared.
    Victory,
}

/// Reasons a build, summon or dismiss request may be rejected by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The session is no longer in play.
    InvalidMode,
    /// The player lacks the resources to pay for the request.
    InsufficientResources,
    /// The tile under the player is not bare floor.
    TileUnavailable,
    /// There is no summoned shadow to dismiss.
    NoShadow,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player step one tile in the provided direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Reveals fog of war around the player.
    Scan {
        /// Reveals one distance layer per interval instead of all at once.
        animated: bool,
    },
    /// Converts the floor tile under the player into a wall.
    BuildWall,
    /// Converts the floor tile under the player into a trap.
    BuildTrap {
        /// Type of trap to construct.
        kind: TrapKind,
    },
    /// Summons a shadow companion on the player's tile.
    SummonShadow {
        /// Type of shadow to summon.
        kind: ShadowKind,
    },
    /// Dismisses the most recently summoned shadow and refunds its cost.
    DismissShadow,
    /// Flips every shadow between following and attacking.
    ToggleShadowAttack,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a freshly generated level is ready.
    LevelStarted {
        /// One-based level number.
        level: u32,
        /// Number of tile columns in the generated grid.
        width: u32,
        /// Number of tile rows in the generated grid.
        height: u32,
        /// Cell the player starts on.
        spawn: CellCoord,
        /// Cell the player must reach.
        exit: CellCoord,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that the player collected a resource tile.
    ResourceCollected {
        /// Cell the resource was collected from.
        cell: CellCoord,
        /// Player resource total after the pickup.
        total: u32,
    },
    /// Reports cells whose fog of war was lifted.
    TilesRevealed {
        /// Cells that became visible.
        cells: Vec<CellCoord>,
    },
    /// Reports that an enemy changed behavioural state.
    EnemyStateChanged {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// State before the transition.
        from: EnemyState,
        /// State after the transition.
        to: EnemyState,
    },
    /// Confirms that an enemy advanced one step along its path.
    EnemyAdvanced {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Cell occupied before moving.
        from: CellCoord,
        /// Cell occupied after moving.
        to: CellCoord,
    },
    /// Reports that an enemy struck a shadow.
    EnemyAttacked {
        /// Identifier of the attacking enemy.
        enemy: EnemyId,
        /// Identifier of the shadow that was hit.
        shadow: ShadowId,
        /// Damage actually dealt after armor.
        damage: u32,
    },
    /// Reports that an enemy stepped on an armed trap.
    TrapTriggered {
        /// Cell hosting the trap.
        cell: CellCoord,
        /// Type of trap that fired.
        trap: TrapKind,
        /// Identifier of the enemy that triggered the trap.
        enemy: EnemyId,
        /// Damage actually dealt after armor.
        damage: u32,
    },
    /// Reports that an enemy was removed after its health reached zero.
    EnemyDefeated {
        /// Identifier of the defeated enemy.
        enemy: EnemyId,
    },
    /// Confirms that a structure was built on the provided cell.
    TileBuilt {
        /// Cell that was converted.
        cell: CellCoord,
        /// Tile kind after the conversion.
        kind: TileKind,
    },
    /// Reports that a build, summon or dismiss request was rejected.
    BuildRejected {
        /// Specific reason the request failed.
        reason: BuildError,
    },
    /// Confirms that a shadow was summoned.
    ShadowSummoned {
        /// Identifier allocated to the shadow.
        shadow: ShadowId,
        /// Type of shadow summoned.
        kind: ShadowKind,
        /// Cell the shadow appeared on.
        cell: CellCoord,
    },
    /// Confirms that a shadow was dismissed and its cost refunded.
    ShadowDismissed {
        /// Identifier of the dismissed shadow.
        shadow: ShadowId,
        /// Resources returned to the player.
        refund: u32,
    },
    /// Reports that a shadow changed behavioural state.
    ShadowStateChanged {
        /// Identifier of the shadow.
        shadow: ShadowId,
        /// State after the transition.
        state: ShadowState,
    },
    /// Confirms that a shadow advanced one step along its path.
    ShadowAdvanced {
        /// Identifier of the shadow that moved.
        shadow: ShadowId,
        /// Cell occupied before moving.
        from: CellCoord,
        /// Cell occupied after moving.
        to: CellCoord,
    },
    /// Reports that a shadow struck an enemy.
    ShadowAttacked {
        /// Identifier of the attacking shadow.
        shadow: ShadowId,
        /// Identifier of the enemy that was hit.
        enemy: EnemyId,
        /// Damage actually dealt after armor.
        damage: u32,
    },
    /// Reports that a shadow was removed after its health reached zero.
    ShadowDefeated {
        /// Identifier of the defeated shadow.
        shadow: ShadowId,
    },
    /// Reports that an enemy reached the player's tile.
    PlayerCaught {
        /// Identifier of the enemy that caught the player.
        enemy: EnemyId,
    },
    /// Reports that the player reached the exit of the current level.
    LevelCompleted {
        /// One-based level number that was cleared.
        level: u32,
    },
    /// Announces that the final level was cleared.
    CampaignCompleted,
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, ShadowState};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, -3);
        assert_eq!(origin.manhattan_distance(destination), 7);
        assert_eq!(destination.manhattan_distance(origin), 7);
    }

    #[test]
    fn direction_between_only_accepts_orthogonal_neighbours() {
        let origin = CellCoord::new(3, 3);
        for direction in [Direction::North, Direction::East, Direction::South, Direction::West] {
            assert_eq!(Direction::between(origin, origin.step(direction)), Some(direction));
        }
        assert_eq!(Direction::between(origin, CellCoord::new(4, 4)), None);
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn neighbours_are_all_one_step_away() {
        let origin = CellCoord::new(0, 0);
        for neighbour in origin.neighbors() {
            assert_eq!(origin.manhattan_distance(neighbour), 1);
        }
    }

    #[test]
    fn shadow_state_toggle_round_trips() {
        assert_eq!(ShadowState::Idle.toggled(), ShadowState::Attack);
        assert_eq!(ShadowState::Attack.toggled().toggled(), ShadowState::Attack);
    }
}
