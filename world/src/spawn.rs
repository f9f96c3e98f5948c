//! Level construction: cave generation plus player, exit, resource and enemy placement.

use std::cmp::Reverse;

use log::warn;
use rand::{seq::SliceRandom, Rng};
use shadowgrid_core::{CellCoord, EnemyKind, Grid, LevelConfig, TileKind};
use shadowgrid_system_level_generation::CaveGenerator;

use crate::config::SessionConfig;

const MIN_MAP_SIZE: u32 = 8;
const RESOURCE_ATTEMPTS_PER_TILE: u32 = 50;
const FALLBACK_SPAWN: CellCoord = CellCoord::new(2, 2);

/// Fully placed level ready to be played.
#[derive(Debug)]
pub(crate) struct LevelLayout {
    pub(crate) grid: Grid,
    pub(crate) spawn: CellCoord,
    pub(crate) exit: CellCoord,
    pub(crate) enemies: Vec<(EnemyKind, CellCoord)>,
}

pub(crate) fn build_level<R>(
    config: &SessionConfig,
    level: &LevelConfig,
    rng: &mut R,
) -> LevelLayout
where
    R: Rng + ?Sized,
{
    let size = map_size(level.grid_size, config.map_scale);
    let (walls, region) = CaveGenerator::new(size, size)
        .generate(rng, config.wall_probability, config.smoothing_iterations)
        .into_parts();
    let mut grid = Grid::from_wall_mask(&walls);

    let spawn = match player_spawn(&region) {
        Some(cell) => cell,
        None => {
            warn!("no floor region on a {size}x{size} map, spawning at {FALLBACK_SPAWN:?}");
            let _ = grid.set_kind(FALLBACK_SPAWN, TileKind::Floor);
            FALLBACK_SPAWN
        }
    };

    let exit = choose_exit(&region, spawn, level.grid_size, size, rng);
    let _ = grid.set_kind(exit, TileKind::Exit);

    place_resources(&mut grid, spawn, level.resource_count, rng);
    let enemies = place_enemies(&region, spawn, exit, level, size, rng);

    LevelLayout {
        grid,
        spawn,
        exit,
        enemies,
    }
}

fn map_size(grid_size: u32, scale: f64) -> u32 {
    let scaled = (f64::from(grid_size) * scale).floor();
    (scaled as u32).max(MIN_MAP_SIZE)
}

fn player_spawn(region: &[CellCoord]) -> Option<CellCoord> {
    region.iter().copied().min_by_key(|cell| {
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        column * column + row * row
    })
}

fn choose_exit<R>(
    region: &[CellCoord],
    spawn: CellCoord,
    grid_size: u32,
    size: u32,
    rng: &mut R,
) -> CellCoord
where
    R: Rng + ?Sized,
{
    let far: Vec<CellCoord> = region
        .iter()
        .copied()
        .filter(|cell| cell.manhattan_distance(spawn) > grid_size / 2)
        .collect();
    if let Some(cell) = far.choose(rng) {
        return *cell;
    }
    if let Some(cell) = region
        .iter()
        .copied()
        .filter(|cell| *cell != spawn)
        .min_by_key(|cell| Reverse(cell.manhattan_distance(spawn)))
    {
        return cell;
    }
    let corner = span(size) - 3;
    CellCoord::new(corner, corner)
}

fn place_resources<R>(grid: &mut Grid, spawn: CellCoord, count: u32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let width = span(grid.width());
    let height = span(grid.height());
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < count * RESOURCE_ATTEMPTS_PER_TILE {
        attempts += 1;
        let cell = CellCoord::new(rng.gen_range(3..=width - 3), rng.gen_range(3..=height - 3));
        let is_floor = grid
            .tile(cell)
            .is_some_and(|tile| tile.kind() == TileKind::Floor);
        if is_floor && cell != spawn && grid.set_kind(cell, TileKind::Resource) {
            placed += 1;
        }
    }
    if placed < count {
        warn!("placed {placed} of {count} resources");
    }
}

fn place_enemies<R>(
    region: &[CellCoord],
    spawn: CellCoord,
    exit: CellCoord,
    level: &LevelConfig,
    size: u32,
    rng: &mut R,
) -> Vec<(EnemyKind, CellCoord)>
where
    R: Rng + ?Sized,
{
    let mut candidates: Vec<CellCoord> = region
        .iter()
        .copied()
        .filter(|cell| *cell != exit && cell.manhattan_distance(spawn) > level.grid_size / 3)
        .collect();
    candidates.shuffle(rng);
    let mut candidates = candidates.into_iter();

    let limit = span(size) - 4;
    let mut enemies = Vec::new();
    for (kind, count) in level.enemies {
        for _ in 0..*count {
            let cell = candidates.next().unwrap_or_else(|| {
                CellCoord::new(rng.gen_range(3..=limit), rng.gen_range(3..=limit))
            });
            enemies.push((*kind, cell));
        }
    }
    enemies
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
    fn map_size_scales_and_floors() {
        assert_eq!(map_size(12, 1.5), 18);
        assert_eq!(map_size(15, 1.5), 22);
        assert_eq!(map_size(12, 0.1), MIN_MAP_SIZE);
    }

    #[test]
    fn spawn_prefers_the_top_left() {
        let region = [CellCoord::new(5, 1), CellCoord::new(2, 3), CellCoord::new(4, 4)];
        assert_eq!(player_spawn(&region), Some(CellCoord::new(2, 3)));
        assert_eq!(player_spawn(&[]), None);
    }

    #[test]
    fn exit_falls_back_to_the_farthest_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spawn = CellCoord::new(1, 1);
        let region = [spawn, CellCoord::new(2, 1), CellCoord::new(3, 1)];
        assert_eq!(choose_exit(&region, spawn, 12, 18, &mut rng), CellCoord::new(3, 1));
        assert_eq!(choose_exit(&[], spawn, 12, 18, &mut rng), CellCoord::new(15, 15));
    }

    #[test]
    fn exit_never_lands_on_the_spawn() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let spawn = CellCoord::new(4, 4);
        assert_eq!(choose_exit(&[spawn], spawn, 12, 18, &mut rng), CellCoord::new(15, 15));
    }

    #[test]
    fn all_wall_level_still_places_everyone() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = SessionConfig {
            wall_probability: 1.0,
            ..SessionConfig::default()
        };
        let level = LevelConfig::first();
        let layout = build_level(&config, &level, &mut rng);

        assert_eq!(layout.spawn, FALLBACK_SPAWN);
        assert!(layout.grid.is_passable(layout.spawn));
        assert_eq!(layout.exit, CellCoord::new(15, 15));
        assert_eq!(layout.enemies.len(), 1);
    }
}
