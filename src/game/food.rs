//! Food placement over the free cells of the grid.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};
use std::fmt;

use super::grid::{Cell, Grid};

/// Source of uniformly distributed indices. Injected so tests can make food
/// placement reproducible.
pub trait IndexSource {
    /// Return an index in `0..bound`. `bound` is never zero.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// [`IndexSource`] backed by any `rand` generator
#[derive(Debug)]
pub struct RngIndexSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngIndexSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngIndexSource<StdRng> {
    /// Seeded generator for reproducible food sequences
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> IndexSource for RngIndexSource<R> {
    fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Replays a fixed list of indices, cycling when exhausted. Values are
/// reduced modulo the requested bound.
#[derive(Debug, Clone)]
pub struct SequenceIndexSource {
    values: VecDeque<usize>,
}

impl SequenceIndexSource {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl IndexSource for SequenceIndexSource {
    fn next_index(&mut self, bound: usize) -> usize {
        match self.values.pop_front() {
            Some(value) => {
                self.values.push_back(value);
                value % bound
            }
            None => 0,
        }
    }
}

/// Every cell of the grid is occupied by the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSpaceAvailable;

impl fmt::Display for NoSpaceAvailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no free cell left for food")
    }
}

impl std::error::Error for NoSpaceAvailable {}

pub struct FoodPlacer {
    source: Box<dyn IndexSource>,
}

impl FoodPlacer {
    pub fn new(source: impl IndexSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Pick a uniformly random free cell. The free cells are counted, not
    /// collected, so memory stays proportional to the snake.
    pub fn place(&mut self, occupied: &[Cell], grid: &Grid) -> Result<Cell, NoSpaceAvailable> {
        let occupied: HashSet<Cell> = occupied
            .iter()
            .copied()
            .filter(|cell| grid.in_bounds(*cell))
            .collect();
        let free = grid.cell_count().saturating_sub(occupied.len());

        if free == 0 {
            return Err(NoSpaceAvailable);
        }

        let index = self.source.next_index(free).min(free - 1);
        grid.cells()
            .filter(|cell| !occupied.contains(cell))
            .nth(index)
            .ok_or(NoSpaceAvailable)
    }
}

impl fmt::Debug for FoodPlacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodPlacer").finish_non_exhaustive()
    }
}

impl Default for FoodPlacer {
    fn default() -> Self {
        Self::new(RngIndexSource::new(StdRng::from_entropy()))
    }
}
