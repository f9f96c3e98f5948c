//! ASCII renderings of generated caves and live sessions.

use shadowgrid_core::{CellCoord, Positionable, TileKind, WallMask};
use shadowgrid_world::{query, World};

/// Draws a wall mask with `#` for walls and `.` for floor.
pub(crate) fn walls(mask: &WallMask) -> String {
    let mut output = String::with_capacity(capacity(mask.width(), mask.height()));
    for row in 0..span(mask.height()) {
        for column in 0..span(mask.width()) {
            let wall = mask.is_wall(CellCoord::new(column, row));
            output.push(if wall { '#' } else { '.' });
        }
        output.push('\n');
    }
    output
}

/// Draws the current level as the player knows it; unrevealed tiles stay blank.
pub(crate) fn session(world: &World) -> String {
    let grid = query::grid(world);
    let player = query::player(world).cell();
    let mut output = String::with_capacity(capacity(grid.width(), grid.height()));

    for row in 0..span(grid.height()) {
        for column in 0..span(grid.width()) {
            let cell = CellCoord::new(column, row);
            output.push(glyph(world, cell, player));
        }
        output.push('\n');
    }
    output
}

fn glyph(world: &World, cell: CellCoord, player: CellCoord) -> char {
    if cell == player {
        return '@';
    }
    if query::enemies(world).iter().any(|enemy| enemy.cell() == cell) {
        return 'E';
    }
    if query::shadows(world).iter().any(|shadow| shadow.cell() == cell) {
        return 'S';
    }
    let Some(tile) = query::grid(world).tile(cell) else {
        return ' ';
    };
    if !tile.is_visible() {
        return ' ';
    }
    match tile.kind() {
        TileKind::Floor => '.',
        TileKind::Wall => '#',
        TileKind::Trap(_) => '^',
        TileKind::Resource => '$',
        TileKind::Exit => 'X',
    }
}

/// Bytes needed for `height` rows of `width` glyphs plus newlines.
fn capacity(width: u32, height: u32) -> usize {
    let width = usize::try_from(width).unwrap_or(usize::MAX);
    let height = usize::try_from(height).unwrap_or(usize::MAX);
    width.saturating_add(1).saturating_mul(height)
}

fn span(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_saturates_instead_of_overflowing() {
        assert_eq!(capacity(3, 2), 8);
        assert!(capacity(u32::MAX, u32::MAX) > capacity(u32::MAX, 1));
    }

    #[test]
    fn walls_render_one_row_per_line() {
        let mut mask = WallMask::filled(3, 2, true);
        mask.set(CellCoord::new(1, 1), false);
        assert_eq!(walls(&mask), "###\n#.#\n");
    }
}
