use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyLevel;
use super::direction::Direction;

/// Largest grid the terminal host accepts
pub const MAX_GRID_EXTENT: usize = 1000;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per side of the square grid
    pub grid_extent: usize,
    /// Initial length of the snake
    pub initial_length: usize,
    /// Heading at the start of every game
    pub start_direction: Direction,
    /// Difficulty the session starts on
    pub difficulty: DifficultyLevel,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_extent: 20,
            initial_length: 5,
            start_direction: Direction::Right,
            difficulty: DifficultyLevel::Medium,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(extent: usize) -> Self {
        Self {
            grid_extent: extent,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self {
            initial_length: 3,
            ..Self::new(10)
        }
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(30)
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyLevel) -> Self {
        self.difficulty = difficulty;
        self
    }
}
