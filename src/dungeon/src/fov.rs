//! Field of view.
//!
//! `FovMap` mirrors the grid's sight and passability flags; `compute`
//! returns the set of cells visible from an origin.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FovAlgorithm {
    /// Recursive shadowcasting over eight octants.
    #[default]
    Shadowcasting,
    /// One Bresenham line per cell in range.
    Raycast,
}

/// Octant transforms for shadowcasting: `[xx, xy, yx, yy]` per octant.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FovMap {
    width: i32,
    height: i32,
    transparent: Vec<bool>,
    walkable: Vec<bool>,
}

impl FovMap {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            transparent: grid.iter().map(|(_, _, tile)| !tile.block_sight).collect(),
            walkable: grid.iter().map(|(_, _, tile)| !tile.blocked).collect(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height)
            .then(|| (y * self.width + x) as usize)
    }

    pub fn is_transparent(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.transparent[i])
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.walkable[i])
    }

    /// Cells visible from `(x, y)`. A `radius` of 0 means unlimited. With
    /// `light_walls` off, opaque cells are never reported.
    pub fn compute(
        &self,
        x: i32,
        y: i32,
        radius: i32,
        light_walls: bool,
        algorithm: FovAlgorithm,
    ) -> VisibleSet {
        let mut visible = VisibleSet::empty(self.width, self.height);
        if self.index(x, y).is_none() {
            return visible;
        }
        let reach = Reach::new(radius, self.width + self.height);
        visible.insert(x, y);

        match algorithm {
            FovAlgorithm::Shadowcasting => {
                for octant in OCTANTS {
                    self.cast_light(&mut visible, x, y, reach, light_walls, 1, 1.0, 0.0, octant);
                }
            }
            FovAlgorithm::Raycast => self.raycast(&mut visible, x, y, reach, light_walls),
        }
        visible
    }

    #[allow(clippy::too_many_arguments)]
    fn cast_light(
        &self,
        visible: &mut VisibleSet,
        cx: i32,
        cy: i32,
        reach: Reach,
        light_walls: bool,
        row: i32,
        mut start: f64,
        end: f64,
        [xx, xy, yx, yy]: [i32; 4],
    ) {
        if start < end {
            return;
        }
        let mut new_start = 0.0;

        for distance in row..=reach.steps {
            let dy = -distance;
            let mut blocked = false;

            for dx in -distance..=0 {
                let map_x = cx + dx * xx + dy * xy;
                let map_y = cy + dx * yx + dy * yy;
                let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

                if start < right_slope {
                    continue;
                }
                if end > left_slope {
                    break;
                }

                let transparent = self.is_transparent(map_x, map_y);
                if reach.covers(dx, dy) && (transparent || light_walls) {
                    visible.insert(map_x, map_y);
                }

                if blocked {
                    if !transparent {
                        new_start = right_slope;
                    } else {
                        blocked = false;
                        start = new_start;
                    }
                } else if !transparent && distance < reach.steps {
                    blocked = true;
                    self.cast_light(
                        visible,
                        cx,
                        cy,
                        reach,
                        light_walls,
                        distance + 1,
                        start,
                        left_slope,
                        [xx, xy, yx, yy],
                    );
                    new_start = right_slope;
                }
            }

            if blocked {
                break;
            }
        }
    }

    fn raycast(&self, visible: &mut VisibleSet, x: i32, y: i32, reach: Reach, light_walls: bool) {
        for dy in -reach.steps..=reach.steps {
            for dx in -reach.steps..=reach.steps {
                if !reach.covers(dx, dy) {
                    continue;
                }
                let (tx, ty) = (x + dx, y + dy);
                if self.index(tx, ty).is_none() {
                    continue;
                }
                if !light_walls && !self.is_transparent(tx, ty) {
                    continue;
                }
                if self.line_is_clear(x, y, tx, ty) {
                    visible.insert(tx, ty);
                }
            }
        }
    }

    /// Bresenham walk from source to target; every cell strictly between
    /// them must be transparent.
    fn line_is_clear(&self, src_x: i32, src_y: i32, target_x: i32, target_y: i32) -> bool {
        let dx = (target_x - src_x).abs();
        let dy = (target_y - src_y).abs();
        let sx = if src_x < target_x { 1 } else { -1 };
        let sy = if src_y < target_y { 1 } else { -1 };
        let mut err = dx - dy;
        let (mut cx, mut cy) = (src_x, src_y);

        loop {
            if cx == target_x && cy == target_y {
                return true;
            }
            if (cx, cy) != (src_x, src_y) && !self.is_transparent(cx, cy) {
                return false;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                cx += sx;
            }
            if e2 < dx {
                err += dx;
                cy += sy;
            }
        }
    }
}

/// How far a cast may go. An unlimited radius walks `steps` rows with no
/// circular cut-off.
#[derive(Clone, Copy, Debug)]
struct Reach {
    steps: i32,
    radius_sq: Option<i32>,
}

impl Reach {
    fn new(radius: i32, map_span: i32) -> Self {
        if radius <= 0 {
            Self {
                steps: map_span,
                radius_sq: None,
            }
        } else {
            Self {
                steps: radius,
                radius_sq: Some(radius * radius),
            }
        }
    }

    fn covers(&self, dx: i32, dy: i32) -> bool {
        self.radius_sq.is_none_or(|r| dx * dx + dy * dy <= r)
    }
}

/// Dense visibility bitmap over a map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleSet {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl VisibleSet {
    pub fn empty(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height)
            .then(|| (y * self.width + x) as usize)
    }

    fn insert(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = true;
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&v| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(move |(i, _)| (i as i32 % width, i as i32 / width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use proptest::prelude::*;

    fn open_room(width: i32, height: i32) -> Grid {
        let mut grid = Grid::new(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                grid.carve(x, y);
            }
        }
        grid
    }

    #[test]
    fn origin_is_visible() {
        let fov = FovMap::from_grid(&open_room(10, 10));
        for algorithm in [FovAlgorithm::Shadowcasting, FovAlgorithm::Raycast] {
            let visible = fov.compute(4, 4, 1, true, algorithm);
            assert!(visible.contains(4, 4));
        }
    }

    #[test]
    fn open_room_is_fully_lit_with_walls() {
        let grid = open_room(9, 7);
        let fov = FovMap::from_grid(&grid);
        let visible = fov.compute(4, 3, 0, true, FovAlgorithm::Shadowcasting);
        for (x, y, _) in grid.iter() {
            assert!(visible.contains(x, y), "({x}, {y}) should be visible");
        }
    }

    #[test]
    fn mask_mirrors_the_grid() {
        let mut grid = open_room(6, 6);
        *grid.tile_mut(2, 2).unwrap() = Tile::wall();
        let fov = FovMap::from_grid(&grid);
        assert!(fov.is_walkable(1, 1) && fov.is_transparent(1, 1));
        assert!(!fov.is_walkable(2, 2) && !fov.is_transparent(2, 2));
        assert!(!fov.is_walkable(0, 3));
        assert!(!fov.is_walkable(-1, 3) && !fov.is_walkable(6, 3));
    }

    #[test]
    fn unlimited_radius_reaches_the_far_corner() {
        let fov = FovMap::from_grid(&open_room(20, 20));
        for algorithm in [FovAlgorithm::Shadowcasting, FovAlgorithm::Raycast] {
            let visible = fov.compute(1, 1, 0, true, algorithm);
            assert!(visible.contains(18, 18), "{algorithm:?} missed the far corner");
            assert!(visible.contains(19, 19), "{algorithm:?} missed the corner wall");
        }
    }

    #[test]
    fn light_walls_off_hides_opaque_cells() {
        let fov = FovMap::from_grid(&open_room(9, 7));
        let visible = fov.compute(4, 3, 0, false, FovAlgorithm::Shadowcasting);
        assert!(!visible.contains(0, 0));
        assert!(!visible.contains(8, 3));
        assert!(visible.contains(7, 3));
    }

    #[test]
    fn wall_casts_a_shadow() {
        let mut grid = open_room(12, 5);
        *grid.tile_mut(5, 2).unwrap() = Tile::wall();
        let fov = FovMap::from_grid(&grid);
        for algorithm in [FovAlgorithm::Shadowcasting, FovAlgorithm::Raycast] {
            let visible = fov.compute(2, 2, 0, true, algorithm);
            assert!(visible.contains(5, 2));
            assert!(!visible.contains(8, 2), "{algorithm:?} saw through a wall");
        }
    }

    #[test]
    fn radius_limits_sight() {
        let fov = FovMap::from_grid(&open_room(30, 5));
        let visible = fov.compute(2, 2, 5, true, FovAlgorithm::Shadowcasting);
        assert!(visible.contains(7, 2));
        assert!(!visible.contains(8, 2));
    }

    #[test]
    fn enclosed_cell_is_never_visible() {
        let mut grid = open_room(15, 15);
        for y in 8..=10 {
            for x in 8..=10 {
                *grid.tile_mut(x, y).unwrap() = Tile::wall();
            }
        }
        grid.carve(9, 9);
        let fov = FovMap::from_grid(&grid);
        for algorithm in [FovAlgorithm::Shadowcasting, FovAlgorithm::Raycast] {
            assert!(!fov.compute(2, 2, 0, true, algorithm).contains(9, 9));
        }
    }

    #[test]
    fn origin_outside_map_sees_nothing() {
        let fov = FovMap::from_grid(&open_room(5, 5));
        assert!(fov.compute(-1, 2, 3, true, FovAlgorithm::Shadowcasting).is_empty());
    }

    fn arb_grid() -> impl Strategy<Value = (Grid, (i32, i32))> {
        proptest::collection::vec(any::<bool>(), 20 * 15).prop_map(|walls| {
            let mut grid = Grid::new(20, 15);
            for (i, open) in walls.into_iter().enumerate() {
                if open {
                    grid.carve(i as i32 % 20, i as i32 / 20);
                }
            }
            grid.carve(10, 7);
            (grid, (10, 7))
        })
    }

    proptest! {
        #[test]
        fn larger_radius_only_adds_cells(
            (grid, (ox, oy)) in arb_grid(),
            r in 1i32..8,
            extra in 1i32..6,
            light_walls in any::<bool>(),
        ) {
            let fov = FovMap::from_grid(&grid);
            let small = fov.compute(ox, oy, r, light_walls, FovAlgorithm::Shadowcasting);
            let large = fov.compute(ox, oy, r + extra, light_walls, FovAlgorithm::Shadowcasting);
            prop_assert!(small.contains(ox, oy));
            for (x, y) in small.iter() {
                prop_assert!(large.contains(x, y), "({}, {}) lost at radius {}", x, y, r + extra);
            }
        }
    }
}
