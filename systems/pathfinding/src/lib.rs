#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid search shared by the AI systems and the fog of war reveal.
//!
//! [`Pathfinder::find_path`] runs a cost-weighted A* with the Manhattan
//! heuristic over the four orthogonal neighbours, and
//! [`Pathfinder::scan_layers`] runs an unweighted breadth-first search that
//! groups cells by their graph distance from an origin. [`RevealWave`] turns
//! those layers into a timed, ring-by-ring reveal.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
    time::Duration,
};

use log::debug;
use shadowgrid_core::{CellCoord, Grid};

/// Reusable A* and breadth-first search over a [`Grid`].
///
/// The dense scratch buffers are kept between queries so repeated path
/// requests on the same grid do not reallocate.
#[derive(Debug)]
pub struct Pathfinder {
    ignore_fog: bool,
    cost_so_far: Vec<u32>,
    came_from: Vec<Option<usize>>,
    frontier: BinaryHeap<FrontierNode>,
}

impl Pathfinder {
    /// Creates a pathfinder that searches through fogged tiles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pathfinder with an explicit fog policy.
    #[must_use]
    pub fn with_fog_policy(ignore_fog: bool) -> Self {
        Self {
            ignore_fog,
            ..Self::default()
        }
    }

    /// Whether searches may enter tiles still covered by fog of war.
    #[must_use]
    pub const fn ignores_fog(&self) -> bool {
        self.ignore_fog
    }

    /// Switches whether searches may enter fogged tiles.
    pub fn set_ignore_fog(&mut self, ignore_fog: bool) {
        self.ignore_fog = ignore_fog;
    }

    /// Computes a cheapest path from `start` to `goal`.
    ///
    /// The returned cells exclude `start` and end with `goal`. An empty
    /// vector means the goal is unreachable, out of bounds, a wall, or equal
    /// to the start.
    pub fn find_path(&mut self, start: CellCoord, goal: CellCoord, grid: &Grid) -> Vec<CellCoord> {
        let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
            return Vec::new();
        };
        if start_index == goal_index {
            return Vec::new();
        }

        self.prepare(grid.cell_count());
        self.cost_so_far[start_index] = 0;

        let mut order = 0_u64;
        self.frontier.push(FrontierNode {
            estimate: start.manhattan_distance(goal),
            order,
            cost: 0,
            index: start_index,
            cell: start,
        });

        let mut reached = false;
        while let Some(current) = self.frontier.pop() {
            if current.index == goal_index {
                reached = true;
                break;
            }
            if current.cost > self.cost_so_far[current.index] {
                continue;
            }

            for next in current.cell.neighbors() {
                let (Some(next_index), Some(tile)) = (grid.index(next), grid.tile(next)) else {
                    continue;
                };
                if tile.is_blocking() || (!self.ignore_fog && !tile.is_visible()) {
                    continue;
                }

                let tentative = current.cost.saturating_add(tile.movement_cost());
                if tentative < self.cost_so_far[next_index] {
                    self.cost_so_far[next_index] = tentative;
                    self.came_from[next_index] = Some(current.index);
                    order += 1;
                    self.frontier.push(FrontierNode {
                        estimate: tentative.saturating_add(next.manhattan_distance(goal)),
                        order,
                        cost: tentative,
                        index: next_index,
                        cell: next,
                    });
                }
            }
        }
        self.frontier.clear();

        if !reached {
            debug!("no path from {start:?} to {goal:?}");
            return Vec::new();
        }

        self.reconstruct(start_index, goal_index, grid)
    }

    /// Groups every cell within `radius` steps of `origin` by exact distance.
    ///
    /// `layers[d]` holds the cells at breadth-first distance `d`, for `d` in
    /// `0..=radius`. Walls do not stop the search, so the reveal reaches
    /// behind them. An origin outside the grid yields no layers, and the
    /// radius is clamped to the longest distance the grid can hold.
    #[must_use]
    pub fn scan_layers(&self, origin: CellCoord, grid: &Grid, radius: u32) -> Vec<Vec<CellCoord>> {
        let Some(origin_index) = grid.index(origin) else {
            return Vec::new();
        };
        let farthest = grid
            .width()
            .saturating_sub(1)
            .saturating_add(grid.height().saturating_sub(1));
        let radius = radius.min(farthest);
        let layer_count = usize::try_from(radius).map_or(0, |radius| radius.saturating_add(1));
        let mut layers = vec![Vec::new(); layer_count];
        let mut distances: Vec<Option<u32>> = vec![None; grid.cell_count()];
        let mut queue = VecDeque::new();

        distances[origin_index] = Some(0);
        queue.push_back((origin, 0_u32));

        while let Some((cell, distance)) = queue.pop_front() {
            if let Some(layer) = usize::try_from(distance).ok().and_then(|d| layers.get_mut(d)) {
                layer.push(cell);
            }
            if distance >= radius {
                continue;
            }
            for next in cell.neighbors() {
                let Some(next_index) = grid.index(next) else {
                    continue;
                };
                if distances[next_index].is_none() {
                    distances[next_index] = Some(distance + 1);
                    queue.push_back((next, distance + 1));
                }
            }
        }

        layers
    }

    /// Every cell within `radius` steps of `origin`, nearest first.
    #[must_use]
    pub fn scan(&self, origin: CellCoord, grid: &Grid, radius: u32) -> Vec<CellCoord> {
        self.scan_layers(origin, grid, radius)
            .into_iter()
            .flatten()
            .collect()
    }

    fn prepare(&mut self, cell_count: usize) {
        self.cost_so_far.clear();
        self.cost_so_far.resize(cell_count, u32::MAX);
        self.came_from.clear();
        self.came_from.resize(cell_count, None);
        self.frontier.clear();
    }

    fn reconstruct(&self, start_index: usize, goal_index: usize, grid: &Grid) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut current = goal_index;
        while current != start_index {
            let Some(cell) = grid.cell_at(current) else {
                return Vec::new();
            };
            path.push(cell);
            match self.came_from.get(current).copied().flatten() {
                Some(previous) if path.len() <= grid.cell_count() => current = previous,
                _ => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self {
            ignore_fog: true,
            cost_so_far: Vec::new(),
            came_from: Vec::new(),
            frontier: BinaryHeap::new(),
        }
    }
}

/// Sum of the movement costs of every cell on the path.
///
/// Returns `None` when a cell lies outside the grid.
#[must_use]
pub fn path_cost(grid: &Grid, path: &[CellCoord]) -> Option<u32> {
    path.iter().try_fold(0_u32, |total, cell| {
        grid.tile(*cell)
            .map(|tile| total.saturating_add(tile.movement_cost()))
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontierNode {
    estimate: u32,
    order: u64,
    cost: u32,
    index: usize,
    cell: CellCoord,
}

// Reversed so the max-heap pops the lowest estimate, oldest entry first.
impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Releases breadth-first layers one at a time on a fixed cadence.
#[derive(Clone, Debug)]
pub struct RevealWave {
    layers: VecDeque<Vec<CellCoord>>,
    interval: Duration,
    accumulator: Duration,
}

impl RevealWave {
    /// Creates a wave over the provided layers.
    #[must_use]
    pub fn new(layers: Vec<Vec<CellCoord>>, interval: Duration) -> Self {
        Self {
            layers: layers.into(),
            interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Removes and returns the next layer without waiting for the cadence.
    pub fn next_layer(&mut self) -> Option<Vec<CellCoord>> {
        self.layers.pop_front()
    }

    /// Credits elapsed time and appends every layer that became due to `out`.
    ///
    /// A zero interval releases all remaining layers at once.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<CellCoord>) {
        if self.interval.is_zero() {
            out.extend(self.layers.drain(..).flatten());
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            match self.layers.pop_front() {
                Some(layer) => out.extend(layer),
                None => {
                    self.accumulator = Duration::ZERO;
                    break;
                }
            }
        }
    }

    /// Number of layers still waiting to be released.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.layers.len()
    }

    /// Reports whether every layer has been released.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.layers.is_empty()
    }
}
