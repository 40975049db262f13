//! High-score persistence
//!
//! The simulator loads the high score once at construction and saves it
//! whenever it increases. Stores report failures through `anyhow`; the
//! simulator logs them and carries on.

pub mod json_file;

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

pub use json_file::JsonFileStore;

/// Load/save contract for the persisted high score
pub trait HighScoreStore {
    /// Return the stored high score, or 0 when nothing has been stored yet
    fn load(&self) -> Result<u32>;

    fn save(&mut self, value: u32) -> Result<()>;
}

/// Process-local store. Clones share the same value, so a test can keep a
/// handle while the simulator owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Arc<AtomicU32>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new(initial: u32) -> Self {
        Self {
            value: Arc::new(AtomicU32::new(initial)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn value(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u32> {
        Ok(self.value())
    }

    fn save(&mut self, value: u32) -> Result<()> {
        self.value.store(value, Ordering::Relaxed);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
