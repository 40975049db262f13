use super::collision::CollisionType;
use super::difficulty::DifficultyLevel;
use super::direction::Direction;
use super::grid::{Cell, Grid};

/// The snake in the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    /// Body segments, with head at index 0
    body: Vec<Cell>,
}

impl Snake {
    /// Create a snake whose body trails behind `head`, opposite to `direction`
    pub fn new(head: Cell, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body }
    }

    /// Like [`Snake::new`], but drops trailing segments that would fall off
    /// the grid. The head is always kept.
    pub fn spawn(grid: &Grid, direction: Direction, length: usize) -> Self {
        let head = grid.center();
        let (dx, dy) = direction.delta();

        // Stops at the first cell off the grid, so `length` never drives the allocation
        let body = std::iter::successors(Some(head), |cell| Some(cell.moved_by(-dx, -dy)))
            .take(length.max(1))
            .take_while(|cell| grid.in_bounds(*cell))
            .collect::<Vec<_>>();

        if body.is_empty() {
            Self { body: vec![head] }
        } else {
            Self { body }
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Option<Self> {
        if cells.is_empty() {
            None
        } else {
            Some(Self { body: cells })
        }
    }

    /// Get the head position
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.body
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Push a new head, dropping the tail unless the snake grows
    pub fn advance(&mut self, new_head: Cell, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Why the last game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Collision(CollisionType),
    /// The snake filled every cell, leaving nowhere to put food
    BoardFull,
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grid_extent: usize,
    pub snake: Vec<Cell>,
    pub food: Option<Cell>,
    pub score: u32,
    pub high_score: u32,
    pub run_state: RunState,
    pub heading: Direction,
    pub difficulty: DifficultyLevel,
    pub game_over_reason: Option<GameOverReason>,
    pub steps: u32,
}

impl Snapshot {
    pub fn head(&self) -> Option<Cell> {
        self.snake.first().copied()
    }
}
