//! Tile grid shared by generation, pathfinding and the AI systems.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, EffectKind};

/// Time a trap needs to re-arm after firing.
pub const TRAP_COOLDOWN: Duration = Duration::from_secs(1);

/// Types of traps the player can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    /// Roots the victim in place.
    Bind,
    /// Deals instant damage.
    Spike,
    /// Slows the victim down.
    Gravity,
}

impl TrapKind {
    /// Every trap kind in catalogue order.
    pub const ALL: [TrapKind; 3] = [TrapKind::Bind, TrapKind::Spike, TrapKind::Gravity];

    /// Static tuning for the trap kind.
    #[must_use]
    pub const fn spec(self) -> TrapSpec {
        match self {
            Self::Bind => TrapSpec {
                cost: 15,
                damage: 0,
                effect: Some((EffectKind::Freeze, Duration::from_secs(3))),
            },
            Self::Spike => TrapSpec {
                cost: 10,
                damage: 5,
                effect: None,
            },
            Self::Gravity => TrapSpec {
                cost: 20,
                damage: 1,
                effect: Some((EffectKind::Slow, Duration::from_secs(5))),
            },
        }
    }
}

/// Cost, damage and status effect applied when a trap fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapSpec {
    /// Resources required to build the trap.
    pub cost: u32,
    /// Damage dealt to the victim, before armor.
    pub damage: u32,
    /// Status effect and its duration, if the trap applies one.
    pub effect: Option<(EffectKind, Duration)>,
}

/// Mutable state carried by a trap tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrapState {
    /// Type of trap occupying the tile.
    pub kind: TrapKind,
    /// Time left before the trap can fire again.
    pub cooldown_remaining: Duration,
    /// Whether the trap fired and has not re-armed yet.
    pub triggered: bool,
}

impl TrapState {
    /// Creates an armed trap of the provided kind.
    #[must_use]
    pub const fn armed(kind: TrapKind) -> Self {
        Self {
            kind,
            cooldown_remaining: Duration::ZERO,
            triggered: false,
        }
    }
}

/// Closed set of tile contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Open, walkable ground.
    Floor,
    /// Impassable terrain, excluded from path searches.
    Wall,
    /// Walkable tile hosting a player-built trap.
    Trap(TrapState),
    /// Walkable tile holding a collectible resource.
    Resource,
    /// Walkable tile that completes the level when reached.
    Exit,
}

impl TileKind {
    /// Reports whether the kind blocks movement.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Movement cost charged for entering a tile of this kind.
    #[must_use]
    pub const fn default_cost(&self) -> u32 {
        match self {
            Self::Trap(_) => 5,
            Self::Wall => 999,
            Self::Floor | Self::Resource | Self::Exit => 1,
        }
    }
}

/// A single square of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    kind: TileKind,
    movement_cost: u32,
    visible: bool,
}

impl Tile {
    /// Creates a fogged tile of the provided kind with its default cost.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        Self {
            kind,
            movement_cost: kind.default_cost(),
            visible: false,
        }
    }

    /// Current contents of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Cost charged by A* for entering the tile; always at least one.
    #[must_use]
    pub const fn movement_cost(&self) -> u32 {
        self.movement_cost
    }

    /// Whether fog of war has been lifted from the tile.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Reports whether the tile blocks movement.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }

    /// Replaces the contents and resets the movement cost to the kind's default.
    pub fn set_kind(&mut self, kind: TileKind) {
        self.kind = kind;
        self.movement_cost = kind.default_cost();
    }

    /// Overrides the movement cost, clamped to a minimum of one.
    pub fn set_movement_cost(&mut self, cost: u32) {
        self.movement_cost = cost.max(1);
    }

    /// Fires the trap on this tile if it is armed.
    ///
    /// Returns the trap kind so the caller can apply its damage and effect.
    pub fn trigger_trap(&mut self) -> Option<TrapKind> {
        let TileKind::Trap(state) = &mut self.kind else {
            return None;
        };
        if !state.cooldown_remaining.is_zero() {
            return None;
        }
        state.triggered = true;
        state.cooldown_remaining = TRAP_COOLDOWN;
        Some(state.kind)
    }

    fn tick(&mut self, dt: Duration) {
        if let TileKind::Trap(state) = &mut self.kind {
            if state.cooldown_remaining.is_zero() {
                return;
            }
            state.cooldown_remaining = state.cooldown_remaining.saturating_sub(dt);
            if state.cooldown_remaining.is_zero() {
                state.triggered = false;
            }
        }
    }
}

/// Boolean wall layout produced by level generation; `true` marks a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallMask {
    width: u32,
    height: u32,
    walls: Vec<bool>,
}

impl WallMask {
    /// Creates a mask with every cell set to `wall`.
    #[must_use]
    pub fn filled(width: u32, height: u32, wall: bool) -> Self {
        let count = cell_count(width, height);
        Self {
            width,
            height,
            walls: vec![wall; count],
        }
    }

    /// Number of columns in the mask.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the mask.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies inside the mask.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        index(self.width, self.height, cell).is_some()
    }

    /// Reports whether the cell is a wall; cells outside the mask count as walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        index(self.width, self.height, cell)
            .and_then(|offset| self.walls.get(offset).copied())
            .unwrap_or(true)
    }

    /// Marks the cell as wall or floor; cells outside the mask are ignored.
    pub fn set(&mut self, cell: CellCoord, wall: bool) {
        if let Some(slot) =
            index(self.width, self.height, cell).and_then(|offset| self.walls.get_mut(offset))
        {
            *slot = wall;
        }
    }

    /// Number of floor cells in the mask.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.walls.iter().filter(|wall| !**wall).count()
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        cells(self.width, self.height)
    }
}

/// Fixed-size two-dimensional array of tiles, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid where every tile is fogged floor.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::new(TileKind::Floor); cell_count(width, height)],
        }
    }

    /// Builds a grid from a generated wall layout.
    #[must_use]
    pub fn from_wall_mask(mask: &WallMask) -> Self {
        let tiles = mask
            .cells()
            .map(|cell| {
                if mask.is_wall(cell) {
                    Tile::new(TileKind::Wall)
                } else {
                    Tile::new(TileKind::Floor)
                }
            })
            .collect();
        Self {
            width: mask.width(),
            height: mask.height(),
            tiles,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Bounds-checked tile lookup by raw coordinates.
    #[must_use]
    pub fn get_tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.tile(CellCoord::new(x, y))
    }

    /// Bounds-checked tile lookup.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|offset| self.tiles.get(offset))
    }

    /// Bounds-checked mutable tile lookup.
    pub fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.index(cell).and_then(|offset| self.tiles.get_mut(offset))
    }

    /// Reports whether the cell exists and does not block movement.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(|tile| !tile.is_blocking())
    }

    /// Replaces the contents of a tile, returning `false` when out of bounds.
    pub fn set_kind(&mut self, cell: CellCoord, kind: TileKind) -> bool {
        match self.tile_mut(cell) {
            Some(tile) => {
                tile.set_kind(kind);
                true
            }
            None => false,
        }
    }

    /// Lifts fog of war from the provided cells, returning the ones that changed.
    pub fn reveal<I>(&mut self, cells: I) -> Vec<CellCoord>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut revealed = Vec::new();
        for cell in cells {
            if let Some(tile) = self.tile_mut(cell) {
                if !tile.visible {
                    tile.visible = true;
                    revealed.push(cell);
                }
            }
        }
        revealed
    }

    /// Counts down every trap cooldown, re-arming traps whose cooldown expired.
    pub fn tick_traps(&mut self, dt: Duration) {
        for tile in &mut self.tiles {
            tile.tick(dt);
        }
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        cells(self.width, self.height)
    }

    /// Row-major offset of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        index(self.width, self.height, cell)
    }

    /// Cell stored at the provided row-major offset.
    #[must_use]
    pub fn cell_at(&self, offset: usize) -> Option<CellCoord> {
        if offset >= self.tiles.len() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = i32::try_from(offset % width).ok()?;
        let row = i32::try_from(offset / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0)
}

fn index(width: u32, height: u32, cell: CellCoord) -> Option<usize> {
    let column = u32::try_from(cell.column()).ok()?;
    let row = u32::try_from(cell.row()).ok()?;
    if column >= width || row >= height {
        return None;
    }
    let width = usize::try_from(width).ok()?;
    let column = usize::try_from(column).ok()?;
    let row = usize::try_from(row).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn cells(width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);
    (0..height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_lookups_are_absent() {
        let grid = Grid::new(4, 3);
        assert!(grid.get_tile(-1, 0).is_none());
        assert!(grid.get_tile(4, 0).is_none());
        assert!(grid.get_tile(0, 3).is_none());
        assert!(grid.get_tile(3, 2).is_some());
        assert!(!grid.is_passable(CellCoord::new(7, 7)));
    }

    #[test]
    fn cell_at_inverts_index() {
        let grid = Grid::new(5, 4);
        for cell in grid.cells() {
            let offset = grid.index(cell).expect("cell inside grid");
            assert_eq!(grid.cell_at(offset), Some(cell));
        }
        assert_eq!(grid.cell_at(20), None);
    }

    #[test]
    fn set_kind_resets_movement_cost() {
        let mut grid = Grid::new(3, 3);
        let cell = CellCoord::new(1, 1);
        assert!(grid.set_kind(cell, TileKind::Trap(TrapState::armed(TrapKind::Spike))));
        assert_eq!(grid.tile(cell).map(Tile::movement_cost), Some(5));
        assert!(grid.set_kind(cell, TileKind::Floor));
        assert_eq!(grid.tile(cell).map(Tile::movement_cost), Some(1));
        assert!(!grid.set_kind(CellCoord::new(3, 0), TileKind::Wall));
    }

    #[test]
    fn movement_cost_never_drops_below_one() {
        let mut tile = Tile::new(TileKind::Floor);
        tile.set_movement_cost(0);
        assert_eq!(tile.movement_cost(), 1);
    }

    #[test]
    fn trap_fires_once_per_cooldown() {
        let mut grid = Grid::new(2, 1);
        let cell = CellCoord::new(0, 0);
        let _ = grid.set_kind(cell, TileKind::Trap(TrapState::armed(TrapKind::Bind)));

        let tile = grid.tile_mut(cell).expect("tile");
        assert_eq!(tile.trigger_trap(), Some(TrapKind::Bind));
        assert_eq!(tile.trigger_trap(), None);

        grid.tick_traps(Duration::from_millis(600));
        let tile = grid.tile_mut(cell).expect("tile");
        assert_eq!(tile.trigger_trap(), None);

        grid.tick_traps(Duration::from_millis(400));
        match grid.tile(cell).map(Tile::kind) {
            Some(TileKind::Trap(state)) => {
                assert!(!state.triggered);
                assert!(state.cooldown_remaining.is_zero());
            }
            other => panic!("expected trap tile, found {other:?}"),
        }
        let tile = grid.tile_mut(cell).expect("tile");
        assert_eq!(tile.trigger_trap(), Some(TrapKind::Bind));
    }

    #[test]
    fn non_trap_tiles_never_trigger() {
        let mut tile = Tile::new(TileKind::Floor);
        assert_eq!(tile.trigger_trap(), None);
    }

    #[test]
    fn reveal_reports_only_newly_visible_cells() {
        let mut grid = Grid::new(3, 3);
        let first = grid.reveal([CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(9, 9)]);
        assert_eq!(first, vec![CellCoord::new(0, 0), CellCoord::new(1, 0)]);
        let second = grid.reveal([CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        assert_eq!(second, vec![CellCoord::new(2, 0)]);
        assert!(grid.tile(CellCoord::new(2, 0)).is_some_and(Tile::is_visible));
    }

    #[test]
    fn wall_mask_treats_outside_as_wall() {
        let mut mask = WallMask::filled(3, 3, false);
        mask.set(CellCoord::new(1, 1), true);
        assert!(mask.is_wall(CellCoord::new(1, 1)));
        assert!(mask.is_wall(CellCoord::new(-1, 0)));
        assert!(!mask.is_wall(CellCoord::new(0, 0)));
        assert_eq!(mask.floor_count(), 8);

        let grid = Grid::from_wall_mask(&mask);
        assert!(!grid.is_passable(CellCoord::new(1, 1)));
        assert!(grid.is_passable(CellCoord::new(2, 2)));
    }
}
