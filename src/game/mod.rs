//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! A host drives it by calling [`SnakeSimulator::tick`] on its own timer.

pub mod collision;
pub mod config;
pub mod difficulty;
pub mod direction;
pub mod engine;
pub mod food;
pub mod grid;
pub mod state;

// Re-export commonly used types
pub use collision::CollisionType;
pub use config::{GameConfig, MAX_GRID_EXTENT};
pub use difficulty::DifficultyLevel;
pub use direction::{Direction, DirectionController};
pub use engine::{SnakeSimulator, TickOutcome};
pub use food::{FoodPlacer, IndexSource, NoSpaceAvailable, RngIndexSource, SequenceIndexSource};
pub use grid::{Cell, Grid};
pub use state::{GameOverReason, RunState, Snake, Snapshot};
