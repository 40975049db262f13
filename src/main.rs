use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::{
    DifficultyLevel, FoodPlacer, GameConfig, MAX_GRID_EXTENT, RngIndexSource, SnakeSimulator,
};
use grid_snake::modes::PlayMode;
use grid_snake::persistence::JsonFileStore;
use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Classic single-player snake in the terminal")]
struct Cli {
    /// Grid cells per side (1 to 1000)
    #[arg(long, default_value = "20", value_parser = parse_extent)]
    extent: usize,

    /// Initial snake length
    #[arg(long, default_value = "5")]
    length: usize,

    /// Starting difficulty (easy, medium, hard); anything else means medium
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    difficulty: DifficultyLevel,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Where to keep the high score (defaults to the platform data directory)
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Log file; the terminal itself is taken by the game
    #[arg(long, default_value = "grid_snake.log")]
    log_file: PathBuf,

    /// Log verbosity
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

fn parse_difficulty(value: &str) -> Result<DifficultyLevel, std::convert::Infallible> {
    Ok(DifficultyLevel::from_name(value))
}

fn parse_extent(value: &str) -> Result<usize, String> {
    let extent: usize = value
        .parse()
        .map_err(|_| format!("`{value}` is not a grid size"))?;

    if (1..=MAX_GRID_EXTENT).contains(&extent) {
        Ok(extent)
    } else {
        Err(format!("grid size must be between 1 and {MAX_GRID_EXTENT}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging before anything else
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
    WriteLogger::init(cli.log_level.into(), Config::default(), log_file)
        .context("Failed to initialize logger")?;

    info!("Starting grid_snake {}", env!("CARGO_PKG_VERSION"));

    // Create game configuration from CLI arguments
    let config = GameConfig {
        grid_extent: cli.extent,
        initial_length: cli.length,
        ..GameConfig::default()
    }
    .with_difficulty(cli.difficulty);

    let store = match cli.high_score_file {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::in_data_dir()?,
    };
    info!("High score file: {:?}", store.path());

    let food_placer = match cli.seed {
        Some(seed) => FoodPlacer::new(RngIndexSource::seeded(seed)),
        None => FoodPlacer::default(),
    };

    let simulator = SnakeSimulator::new(config, food_placer, store);
    let mut play_mode = PlayMode::new(simulator);
    play_mode.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_is_bounded() {
        let cli = Cli::try_parse_from(["grid_snake", "--extent", "1000"]).unwrap();
        assert_eq!(cli.extent, 1000);

        assert!(Cli::try_parse_from(["grid_snake", "--extent", "50000"]).is_err());
        assert!(Cli::try_parse_from(["grid_snake", "--extent", "0"]).is_err());
        assert!(Cli::try_parse_from(["grid_snake", "--extent", "big"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["grid_snake", "--difficulty", "nightmare"]).unwrap();
        assert_eq!(cli.extent, 20);
        assert_eq!(cli.length, 5);
        assert_eq!(cli.difficulty, DifficultyLevel::Medium);
    }
}
