//! Grid Snake - a single-player snake game with a deterministic core
//!
//! This library provides:
//! - Core game state machine (game module)
//! - High-score persistence (persistence module)
//! - Terminal host: input mapping, rendering and the tick scheduler
//!   (input, render, metrics, modes modules)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
