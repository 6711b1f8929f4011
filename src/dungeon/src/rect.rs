use rand::Rng;
use serde::{Deserialize, Serialize};

/// Axis-aligned room bounds. The outer ring (`x1`, `x2`, `y1`, `y2`) stays
/// wall; only the cells strictly inside are carved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Touching edges count as an intersection.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Cells carved for this room: `x1 < x < x2`, `y1 < y < y2`.
    pub fn interior(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        ((self.y1 + 1)..self.y2).flat_map(move |y| ((self.x1 + 1)..self.x2).map(move |x| (x, y)))
    }

    pub fn contains_interior(&self, x: i32, y: i32) -> bool {
        x > self.x1 && x < self.x2 && y > self.y1 && y < self.y2
    }

    /// Uniform cell from the carved interior.
    pub fn random_interior_point(&self, rng: &mut impl Rng) -> (i32, i32) {
        (
            rng.random_range((self.x1 + 1)..=(self.x2 - 1)),
            rng.random_range((self.y1 + 1)..=(self.y2 - 1)),
        )
    }
}
