use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Difficulty selection. Controls pacing and scoring only, never movement
/// or collision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    /// Simulation ticks per second
    pub fn tick_rate(&self) -> u32 {
        match self {
            DifficultyLevel::Easy => 8,
            DifficultyLevel::Medium => 12,
            DifficultyLevel::Hard => 17,
        }
    }

    /// Points awarded per food item
    pub fn score_multiplier(&self) -> u32 {
        match self {
            DifficultyLevel::Easy => 1,
            DifficultyLevel::Medium => 2,
            DifficultyLevel::Hard => 3,
        }
    }

    /// Scheduler period, `1000 / tick_rate` milliseconds
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate()))
    }

    /// Lenient lookup: anything unrecognized maps to [`DifficultyLevel::Medium`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => DifficultyLevel::Easy,
            "hard" => DifficultyLevel::Hard,
            _ => DifficultyLevel::Medium,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }
}

impl FromStr for DifficultyLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
