#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cellular automata cave generator with region connectivity repair.
//!
//! Generation runs in four passes over a [`WallMask`]:
//!
//! 1. seed the border with walls and the interior with random walls,
//! 2. smooth the interior with a 3×3 majority rule on a double buffer,
//! 3. keep only the largest 4-connected floor region,
//! 4. scatter small pillar obstacles that never split the region.
//!
//! Every floor cell of the result is reachable from every other one.

use std::collections::VecDeque;

use log::{debug, warn};
use rand::Rng;
use shadowgrid_core::{CellCoord, WallMask};

const PILLAR_ATTEMPTS_PER_TARGET: u32 = 20;
const PILLAR_MIN_SPAN: u32 = 7;

/// Result of a generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLayout {
    walls: WallMask,
    largest_region: Vec<CellCoord>,
}

impl GeneratedLayout {
    /// Final wall layout.
    #[must_use]
    pub fn walls(&self) -> &WallMask {
        &self.walls
    }

    /// Every floor cell of the surviving region.
    ///
    /// Empty when generation produced no floor at all; callers are expected to
    /// fall back to a default spawn.
    #[must_use]
    pub fn largest_region(&self) -> &[CellCoord] {
        &self.largest_region
    }

    /// Splits the layout into its wall mask and region list.
    #[must_use]
    pub fn into_parts(self) -> (WallMask, Vec<CellCoord>) {
        (self.walls, self.largest_region)
    }
}

/// Cave generator for a fixed map size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaveGenerator {
    width: u32,
    height: u32,
}

impl CaveGenerator {
    /// Creates a generator for maps of the provided dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns in generated maps.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in generated maps.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Generates a connected cave.
    ///
    /// `wall_probability` is the chance an interior cell starts as a wall and
    /// `iterations` is the number of smoothing rounds.
    pub fn generate<R>(
        &self,
        rng: &mut R,
        wall_probability: f64,
        iterations: u32,
    ) -> GeneratedLayout
    where
        R: Rng + ?Sized,
    {
        let mut walls = self.seed(rng, wall_probability);
        for _ in 0..iterations {
            walls = self.smooth(&walls);
        }

        let mut largest_region = keep_largest_region(&mut walls);
        if largest_region.is_empty() {
            warn!(
                "cave generation produced no floor on a {}x{} map",
                self.width, self.height
            );
            return GeneratedLayout {
                walls,
                largest_region,
            };
        }

        let pillars = self.place_pillars(rng, &mut walls);
        largest_region.retain(|cell| !walls.is_wall(*cell));
        debug!(
            "generated {}x{} cave: {} floor cells, {} pillars",
            self.width,
            self.height,
            largest_region.len(),
            pillars
        );

        GeneratedLayout {
            walls,
            largest_region,
        }
    }

    fn seed<R>(&self, rng: &mut R, wall_probability: f64) -> WallMask
    where
        R: Rng + ?Sized,
    {
        let mut walls = WallMask::filled(self.width, self.height, true);
        for cell in self.interior() {
            let wall = rng.gen::<f64>() < wall_probability;
            walls.set(cell, wall);
        }
        walls
    }

    fn smooth(&self, current: &WallMask) -> WallMask {
        let mut next = current.clone();
        for cell in self.interior() {
            let neighbours = surrounding_walls(current, cell);
            if neighbours > 4 {
                next.set(cell, true);
            } else if neighbours < 4 {
                next.set(cell, false);
            }
        }
        next
    }

    fn place_pillars<R>(&self, rng: &mut R, walls: &mut WallMask) -> u32
    where
        R: Rng + ?Sized,
    {
        if self.width < PILLAR_MIN_SPAN || self.height < PILLAR_MIN_SPAN {
            return 0;
        }

        let width = span(self.width);
        let height = span(self.height);
        let target = (self.width / 6).max(3);
        let mut placed = 0;
        let mut attempts = 0;

        while placed < target && attempts < target * PILLAR_ATTEMPTS_PER_TARGET {
            attempts += 1;
            let pillar =
                CellCoord::new(rng.gen_range(3..=width - 4), rng.gen_range(3..=height - 4));
            if walls.is_wall(pillar) {
                continue;
            }

            let mut cells = vec![pillar];
            if rng.gen_bool(0.5) {
                let extra = pillar.neighbors()[rng.gen_range(0..4)];
                let inside = 1 < extra.column()
                    && extra.column() < width - 2
                    && 1 < extra.row()
                    && extra.row() < height - 2;
                if inside && !walls.is_wall(extra) {
                    cells.push(extra);
                }
            }

            for cell in &cells {
                walls.set(*cell, true);
            }
            if walls.floor_count() > 0 && floor_regions(walls).len() == 1 {
                placed += 1;
            } else {
                for cell in &cells {
                    walls.set(*cell, false);
                }
            }
        }

        placed
    }

    fn interior(&self) -> impl Iterator<Item = CellCoord> {
        let width = span(self.width);
        let height = span(self.height);
        (1..height - 1)
            .flat_map(move |row| (1..width - 1).map(move |column| CellCoord::new(column, row)))
    }
}

/// Splits the floor of `walls` into 4-connected regions.
///
/// Regions are discovered in row-major order of their first cell and each
/// region lists its cells in flood-fill order.
#[must_use]
pub fn floor_regions(walls: &WallMask) -> Vec<Vec<CellCoord>> {
    let mut visited = WallMask::filled(walls.width(), walls.height(), false);
    let mut regions = Vec::new();

    for cell in walls.cells() {
        if walls.is_wall(cell) || visited.is_wall(cell) {
            continue;
        }

        let mut region = Vec::new();
        let mut queue = VecDeque::from([cell]);
        visited.set(cell, true);
        while let Some(current) = queue.pop_front() {
            region.push(current);
            for next in current.neighbors() {
                if walls.contains(next) && !walls.is_wall(next) && !visited.is_wall(next) {
                    visited.set(next, true);
                    queue.push_back(next);
                }
            }
        }
        regions.push(region);
    }

    regions
}

/// Walls off every floor region except the largest and returns its cells.
///
/// Ties keep the region discovered first.
pub fn keep_largest_region(walls: &mut WallMask) -> Vec<CellCoord> {
    let mut largest: Vec<CellCoord> = Vec::new();
    for region in floor_regions(walls) {
        if region.len() > largest.len() {
            largest = region;
        }
    }

    let mut repaired = WallMask::filled(walls.width(), walls.height(), true);
    for cell in &largest {
        repaired.set(*cell, false);
    }
    *walls = repaired;
    largest
}

fn surrounding_walls(walls: &WallMask, cell: CellCoord) -> u32 {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if walls.is_wall(CellCoord::new(cell.column() + dx, cell.row() + dy)) {
                count += 1;
            }
        }
    }
    count
}

fn span(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn majority_rule_uses_strict_thresholds() {
        let mut walls = WallMask::filled(5, 5, false);
        for cell in [
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(3, 1),
            CellCoord::new(1, 2),
        ] {
            walls.set(cell, true);
        }
        assert_eq!(surrounding_walls(&walls, CellCoord::new(2, 2)), 4);
        assert_eq!(surrounding_walls(&walls, CellCoord::new(0, 0)), 6);

        let generator = CaveGenerator::new(5, 5);
        let smoothed = generator.smooth(&walls);
        assert!(!smoothed.is_wall(CellCoord::new(2, 2)));
        assert!(!smoothed.is_wall(CellCoord::new(0, 0)), "border is never smoothed");

        walls.set(CellCoord::new(2, 2), true);
        let smoothed = generator.smooth(&walls);
        assert!(smoothed.is_wall(CellCoord::new(2, 2)));
    }

    #[test]
    fn smoothing_reads_only_the_previous_generation() {
        let mut walls = WallMask::filled(7, 7, true);
        for cell in walls.cells().collect::<Vec<_>>() {
            if cell.column() >= 2 && cell.column() <= 4 && cell.row() >= 2 && cell.row() <= 4 {
                walls.set(cell, false);
            }
        }
        let generator = CaveGenerator::new(7, 7);
        let smoothed = generator.smooth(&walls);
        assert!(!smoothed.is_wall(CellCoord::new(3, 3)));
        assert_eq!(smoothed.is_wall(CellCoord::new(2, 2)), smoothed.is_wall(CellCoord::new(4, 4)));
        assert_eq!(smoothed.is_wall(CellCoord::new(2, 4)), smoothed.is_wall(CellCoord::new(4, 2)));
    }

    #[test]
    fn smaller_regions_are_walled_off() {
        let mut walls = WallMask::filled(8, 5, true);
        for column in 1..=3 {
            walls.set(CellCoord::new(column, 1), false);
            walls.set(CellCoord::new(column, 2), false);
        }
        walls.set(CellCoord::new(6, 3), false);

        let region = keep_largest_region(&mut walls);
        assert_eq!(region.len(), 6);
        assert!(walls.is_wall(CellCoord::new(6, 3)));
        assert_eq!(walls.floor_count(), 6);
    }

    #[test]
    fn solid_map_yields_empty_region() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let layout = CaveGenerator::new(12, 12).generate(&mut rng, 1.0, 3);
        assert!(layout.largest_region().is_empty());
        assert_eq!(layout.walls().floor_count(), 0);
    }

    #[test]
    fn tiny_maps_are_all_border() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let layout = CaveGenerator::new(2, 2).generate(&mut rng, 0.0, 3);
        assert!(layout.largest_region().is_empty());
    }
}
