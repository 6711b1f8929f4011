use serde::{Deserialize, Serialize};

/// A single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub blocked: bool,
    pub block_sight: bool,
    /// Set once the cell has been seen; never cleared for the life of the grid.
    pub explored: bool,
}

impl Tile {
    pub fn wall() -> Self {
        Self {
            blocked: true,
            block_sight: true,
            explored: false,
        }
    }

    pub fn floor() -> Self {
        Self {
            blocked: false,
            block_sight: false,
            explored: false,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::wall()
    }
}

/// Fixed-size tile map, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled with walls.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| (y * self.width + x) as usize)
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index(x, y).map(move |i| &mut self.tiles[i])
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_none_or(|t| t.blocked)
    }

    pub fn blocks_sight(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_none_or(|t| t.block_sight)
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_some_and(|t| t.explored)
    }

    /// Makes a cell passable and see-through. Out-of-bounds cells are ignored.
    pub fn carve(&mut self, x: i32, y: i32) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.blocked = false;
            tile.block_sight = false;
        }
    }

    pub fn mark_explored(&mut self, x: i32, y: i32) {
        if let Some(tile) = self.tile_mut(x, y) {
            tile.explored = true;
        }
    }

    /// Iterates `(x, y, &Tile)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (i as i32 % width, i as i32 / width, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_solid_rock() {
        let grid = Grid::new(5, 4);
        assert!(grid.iter().all(|(_, _, t)| t.blocked && t.block_sight && !t.explored));
        assert_eq!(grid.iter().count(), 20);
    }

    #[test]
    fn out_of_bounds_is_blocked() {
        let grid = Grid::new(3, 3);
        assert!(grid.is_blocked(-1, 0));
        assert!(grid.is_blocked(3, 1));
        assert!(grid.blocks_sight(0, 3));
        assert!(grid.tile(5, 5).is_none());
    }

    #[test]
    fn carve_clears_both_flags() {
        let mut grid = Grid::new(3, 3);
        grid.carve(1, 2);
        assert!(!grid.is_blocked(1, 2));
        assert!(!grid.blocks_sight(1, 2));
        assert!(grid.is_blocked(2, 1));
    }

    #[test]
    fn iter_reports_coordinates() {
        let mut grid = Grid::new(4, 2);
        grid.carve(3, 1);
        let open: Vec<_> = grid
            .iter()
            .filter(|(_, _, t)| !t.blocked)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(open, vec![(3, 1)]);
    }
}
