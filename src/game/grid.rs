use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move cell by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Move cell one step in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Square playing field of `extent` cells per side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    extent: i32,
}

impl Grid {
    /// Create a grid. An extent of zero is raised to one so the field always
    /// has room for a head.
    pub fn new(extent: usize) -> Self {
        let extent = i32::try_from(extent.max(1)).unwrap_or(i32::MAX);
        Self { extent }
    }

    pub fn extent(&self) -> usize {
        self.extent as usize
    }

    pub fn cell_count(&self) -> usize {
        self.extent() * self.extent()
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.extent && cell.y >= 0 && cell.y < self.extent
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.extent / 2, self.extent / 2)
    }

    /// All cells, column by column (x outer, y inner)
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.extent).flat_map(move |x| (0..self.extent).map(move |y| Cell::new(x, y)))
    }
}
