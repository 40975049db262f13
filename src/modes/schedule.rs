//! Tick scheduling contract between the simulator and the host timer

use std::time::Duration;

use crate::game::{DifficultyLevel, RunState};

/// Tracks which tick period the host timer should currently run at.
///
/// `None` means no ticks should be delivered (not started, paused or over).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSchedule {
    period: Option<Duration>,
}

impl TickSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period the timer should use for a given state
    pub fn period_for(run_state: RunState, difficulty: DifficultyLevel) -> Option<Duration> {
        match run_state {
            RunState::Running => Some(difficulty.tick_interval()),
            RunState::NotStarted | RunState::Paused | RunState::GameOver => None,
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Recompute the period. Returns the new period when the timer has to be
    /// rebuilt, `None` when the current timer can stay.
    pub fn update(
        &mut self,
        run_state: RunState,
        difficulty: DifficultyLevel,
    ) -> Option<Option<Duration>> {
        let period = Self::period_for(run_state, difficulty);
        if period == self.period {
            return None;
        }
        self.period = period;
        Some(period)
    }
}
