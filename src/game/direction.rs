use serde::{Deserialize, Serialize};

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Two-phase heading buffer.
///
/// Input handlers call [`request_change`](Self::request_change) as often as
/// they like between ticks; the simulator calls [`commit`](Self::commit)
/// exactly once per tick. Only the last accepted request survives, so at most
/// one heading change is applied per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionController {
    current: Direction,
    pending: Direction,
}

impl DirectionController {
    pub fn new(start: Direction) -> Self {
        Self {
            current: start,
            pending: start,
        }
    }

    pub fn current(&self) -> Direction {
        self.current
    }

    pub fn pending(&self) -> Direction {
        self.pending
    }

    /// Buffer `direction` for the next tick. Reversals of the current heading
    /// are dropped and reported as `false`.
    pub fn request_change(&mut self, direction: Direction) -> bool {
        if self.current.is_opposite(direction) {
            return false;
        }
        self.pending = direction;
        true
    }

    pub fn commit(&mut self) -> Direction {
        self.current = self.pending;
        self.current
    }
}

impl Default for DirectionController {
    fn default() -> Self {
        Self::new(Direction::Right)
    }
}
