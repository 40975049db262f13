use log::{debug, info, warn};
use std::collections::HashSet;
use std::time::Duration;

use super::{
    collision::{self, CollisionType},
    config::GameConfig,
    difficulty::DifficultyLevel,
    direction::{Direction, DirectionController},
    food::FoodPlacer,
    grid::{Cell, Grid},
    state::{GameOverReason, RunState, Snake, Snapshot},
};
use crate::persistence::HighScoreStore;

/// What a call to [`SnakeSimulator::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing happened
    Idle,
    /// Moved one cell without eating
    Moved,
    /// Ate food and grew by one cell
    Ate { points: u32 },
    /// Candidate head was fatal; the game is over and the body is unchanged
    Collided(CollisionType),
    /// Ate food but the grid is now full; the game is over
    BoardFilled { points: u32 },
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Collided(_) | TickOutcome::BoardFilled { .. })
    }
}

/// The game state machine.
///
/// Holds no timer: a host calls [`tick`](Self::tick) every
/// [`tick_interval`](Self::tick_interval) while the state is
/// [`RunState::Running`]. Calls that do not fit the current state are
/// absorbed as no-ops.
pub struct SnakeSimulator {
    config: GameConfig,
    grid: Grid,
    difficulty: DifficultyLevel,
    directions: DirectionController,
    snake: Option<Snake>,
    food: Option<Cell>,
    score: u32,
    high_score: u32,
    steps: u32,
    run_state: RunState,
    game_over_reason: Option<GameOverReason>,
    food_placer: FoodPlacer,
    store: Box<dyn HighScoreStore>,
}

impl SnakeSimulator {
    /// Create a simulator. The high score is loaded from `store` here and
    /// nowhere else; a failing load counts as 0.
    pub fn new(
        config: GameConfig,
        food_placer: FoodPlacer,
        store: impl HighScoreStore + 'static,
    ) -> Self {
        let high_score = match store.load() {
            Ok(value) => value,
            Err(err) => {
                warn!("Could not load high score, starting from 0: {err:#}");
                0
            }
        };

        Self {
            grid: Grid::new(config.grid_extent),
            difficulty: config.difficulty,
            directions: DirectionController::new(config.start_direction),
            snake: None,
            food: None,
            score: 0,
            high_score,
            steps: 0,
            run_state: RunState::NotStarted,
            game_over_reason: None,
            food_placer,
            store: Box::new(store),
            config,
        }
    }

    /// Start (or restart) a game with the configured length and heading
    pub fn start(&mut self) {
        self.start_with(self.config.initial_length, self.config.start_direction);
    }

    /// Start (or restart) a game. Valid from every state.
    pub fn start_with(&mut self, initial_length: usize, start_direction: Direction) {
        let snake = Snake::spawn(&self.grid, start_direction, initial_length);

        self.directions = DirectionController::new(start_direction);
        self.score = 0;
        self.steps = 0;
        self.game_over_reason = None;
        self.run_state = RunState::Running;

        info!(
            "Game started: extent={} length={} heading={:?} difficulty={}",
            self.grid.extent(),
            snake.len(),
            start_direction,
            self.difficulty
        );

        let placement = self.food_placer.place(snake.cells(), &self.grid);
        self.snake = Some(snake);
        match placement {
            Ok(cell) => {
                debug!("Food placed at ({}, {})", cell.x, cell.y);
                self.food = Some(cell);
            }
            Err(_) => self.end_game(GameOverReason::BoardFull),
        }
    }

    /// Advance the simulation by one cell
    pub fn tick(&mut self) -> TickOutcome {
        if self.run_state != RunState::Running {
            return TickOutcome::Idle;
        }
        let Some(snake) = self.snake.as_mut() else {
            return TickOutcome::Idle;
        };

        let heading = self.directions.commit();
        let candidate = snake.head().moved_in_direction(heading);

        // Checked against the pre-move body, outgoing tail included
        if let Some(kind) = collision::check(candidate, snake.cells(), &self.grid) {
            self.end_game(GameOverReason::Collision(kind));
            return TickOutcome::Collided(kind);
        }

        let ate_food = self.food == Some(candidate);
        snake.advance(candidate, ate_food);
        self.steps = self.steps.saturating_add(1);

        if !ate_food {
            return TickOutcome::Moved;
        }

        let points = self.difficulty.score_multiplier();
        let placement = self.food_placer.place(snake.cells(), &self.grid);
        self.score += points;
        self.raise_high_score();

        match placement {
            Ok(cell) => {
                debug!("Food placed at ({}, {})", cell.x, cell.y);
                self.food = Some(cell);
                TickOutcome::Ate { points }
            }
            Err(_) => {
                self.end_game(GameOverReason::BoardFull);
                TickOutcome::BoardFilled { points }
            }
        }
    }

    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
            debug!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
            debug!("Resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.run_state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::NotStarted | RunState::GameOver => {}
        }
    }

    /// Buffer a heading change for the next tick. Ignored unless running;
    /// reversals of the current heading are dropped.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.run_state != RunState::Running {
            return false;
        }
        self.directions.request_change(direction)
    }

    /// Switch difficulty. Takes effect for the next tick's scoring and the
    /// host's next interval; movement rules are unaffected.
    pub fn change_difficulty(&mut self, level: DifficultyLevel) {
        if level != self.difficulty {
            info!("Difficulty changed: {} -> {}", self.difficulty, level);
            self.difficulty = level;
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.difficulty.tick_interval()
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn snake(&self) -> Option<&Snake> {
        self.snake.as_ref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn heading(&self) -> Direction {
        self.directions.current()
    }

    pub fn pending_direction(&self) -> Direction {
        self.directions.pending()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid_extent: self.grid.extent(),
            snake: self
                .snake
                .as_ref()
                .map(|snake| snake.cells().to_vec())
                .unwrap_or_default(),
            food: self.food,
            score: self.score,
            high_score: self.high_score,
            run_state: self.run_state,
            heading: self.directions.current(),
            difficulty: self.difficulty,
            game_over_reason: self.game_over_reason,
            steps: self.steps,
        }
    }

    /// Replace body and food of a running or paused game. Lets tests and
    /// tools set up exact positions; the heading buffer is reset to `heading`.
    ///
    /// Returns `false` and leaves the game untouched unless the body cells are
    /// distinct and on the grid and the food is a free cell on the grid.
    pub fn set_position(&mut self, snake: Snake, heading: Direction, food: Cell) -> bool {
        if !matches!(self.run_state, RunState::Running | RunState::Paused) {
            return false;
        }

        let mut seen = HashSet::with_capacity(snake.len());
        let body_ok = snake
            .cells()
            .iter()
            .all(|cell| self.grid.in_bounds(*cell) && seen.insert(*cell));
        if !body_ok || !self.grid.in_bounds(food) || snake.contains(food) {
            return false;
        }

        self.snake = Some(snake);
        self.directions = DirectionController::new(heading);
        self.food = Some(food);
        true
    }

    fn raise_high_score(&mut self) {
        if self.score <= self.high_score {
            return;
        }

        self.high_score = self.score;
        info!("New high score: {}", self.high_score);
        if let Err(err) = self.store.save(self.high_score) {
            warn!("Failed to save high score: {err:#}");
        }
    }

    fn end_game(&mut self, reason: GameOverReason) {
        info!(
            "Game over ({:?}): score={} length={} steps={}",
            reason,
            self.score,
            self.snake.as_ref().map_or(0, Snake::len),
            self.steps
        );
        self.run_state = RunState::GameOver;
        self.game_over_reason = Some(reason);
        self.food = None;
    }
}

impl std::fmt::Debug for SnakeSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnakeSimulator")
            .field("config", &self.config)
            .field("run_state", &self.run_state)
            .field("difficulty", &self.difficulty)
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .field("snake", &self.snake)
            .field("food", &self.food)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::food::SequenceIndexSource;
    use crate::persistence::MemoryStore;
    use anyhow::{Result, anyhow};

    fn simulator(config: GameConfig) -> (SnakeSimulator, MemoryStore) {
        let store = MemoryStore::default();
        let sim = SnakeSimulator::new(
            config,
            FoodPlacer::new(SequenceIndexSource::new([0])),
            store.clone(),
        );
        (sim, store)
    }

    fn started(config: GameConfig) -> (SnakeSimulator, MemoryStore) {
        let (mut sim, store) = simulator(config);
        sim.start();
        (sim, store)
    }

    fn cells(snake: &[(i32, i32)]) -> Vec<Cell> {
        snake.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    struct FailingStore;

    impl HighScoreStore for FailingStore {
        fn load(&self) -> Result<u32> {
            Err(anyhow!("disk on fire"))
        }

        fn save(&mut self, _value: u32) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    #[test]
    fn test_initial_state() {
        let (sim, _) = simulator(GameConfig::default());

        assert_eq!(sim.run_state(), RunState::NotStarted);
        assert!(sim.snake().is_none());
        assert!(sim.food().is_none());
        assert_eq!(sim.score(), 0);
    }

    #[test]
    fn test_start() {
        let (sim, _) = started(GameConfig::default());

        assert_eq!(sim.run_state(), RunState::Running);
        assert_eq!(
            sim.snake().unwrap().cells(),
            cells(&[(10, 10), (9, 10), (8, 10), (7, 10), (6, 10)]).as_slice()
        );
        // First free cell in column order
        assert_eq!(sim.food(), Some(Cell::new(0, 0)));
        assert_eq!(sim.heading(), Direction::Right);
    }

    #[test]
    fn test_tick_is_noop_outside_running() {
        let (mut sim, _) = simulator(GameConfig::default());
        assert_eq!(sim.tick(), TickOutcome::Idle);

        sim.start();
        sim.pause();
        let before = sim.snapshot();
        assert_eq!(sim.tick(), TickOutcome::Idle);
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_basic_movement() {
        let (mut sim, _) = started(GameConfig::default());

        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert_eq!(sim.snake().unwrap().head(), Cell::new(11, 10));
        assert_eq!(sim.snake().unwrap().len(), 5);
        assert_eq!(sim.snapshot().steps, 1);
    }

    #[test]
    fn test_food_consumption() {
        let (mut sim, store) = started(GameConfig::default());
        let snake = sim.snake().unwrap().clone();
        assert!(sim.set_position(snake, Direction::Right, Cell::new(11, 10)));

        assert_eq!(sim.tick(), TickOutcome::Ate { points: 2 });
        assert_eq!(sim.score(), 2);
        assert_eq!(sim.snake().unwrap().len(), 6);
        assert_eq!(sim.snake().unwrap().tail(), Cell::new(6, 10));
        assert_eq!(sim.high_score(), 2);
        assert_eq!(store.value(), 2);

        let food = sim.food().unwrap();
        assert!(!sim.snake().unwrap().contains(food));
    }

    #[test]
    fn test_wall_collision_freezes_state() {
        let (mut sim, _) = started(GameConfig::default());
        let snake = Snake::new(Cell::new(19, 10), Direction::Right, 3);
        assert!(sim.set_position(snake.clone(), Direction::Right, Cell::new(0, 0)));

        assert_eq!(sim.tick(), TickOutcome::Collided(CollisionType::Wall));
        assert_eq!(sim.run_state(), RunState::GameOver);
        assert_eq!(sim.snake(), Some(&snake));
        assert_eq!(sim.score(), 0);
        assert_eq!(
            sim.game_over_reason(),
            Some(GameOverReason::Collision(CollisionType::Wall))
        );
        assert!(sim.food().is_none());
        assert_eq!(sim.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_self_collision() {
        // Body: (5,5), (4,5), (3,5), (2,5), (1,5)
        let (mut sim, _) = started(GameConfig::small());
        let snake = Snake::new(Cell::new(5, 5), Direction::Right, 5);
        assert!(sim.set_position(snake, Direction::Right, Cell::new(9, 9)));

        // Down: (5,6) ...
        sim.request_direction(Direction::Down);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        // Left: (4,6) ...
        sim.request_direction(Direction::Left);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        // Up: (4,5) is still body
        sim.request_direction(Direction::Up);
        assert_eq!(sim.tick(), TickOutcome::Collided(CollisionType::SelfCollision));
    }

    #[test]
    fn test_moving_into_vacating_tail_is_fatal() {
        // 2x2 loop: head (1,0), then (0,0), (0,1), tail (1,1). Moving Down
        // from (1,0) enters (1,1), which the tail would vacate.
        let (mut sim, _) = started(GameConfig::small());
        let snake = Snake::from_cells(cells(&[(1, 0), (0, 0), (0, 1), (1, 1)])).unwrap();
        assert!(sim.set_position(snake, Direction::Down, Cell::new(9, 9)));

        assert_eq!(sim.tick(), TickOutcome::Collided(CollisionType::SelfCollision));
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let (mut sim, _) = started(GameConfig::default());

        assert!(!sim.request_direction(Direction::Left));
        assert_eq!(sim.pending_direction(), Direction::Right);
        sim.tick();
        assert_eq!(sim.heading(), Direction::Right);
    }

    #[test]
    fn test_direction_ignored_while_paused() {
        let (mut sim, _) = started(GameConfig::default());
        sim.pause();

        assert!(!sim.request_direction(Direction::Up));
        sim.resume();
        assert_eq!(sim.pending_direction(), Direction::Right);
    }

    #[test]
    fn test_pause_resume() {
        let (mut sim, _) = started(GameConfig::default());

        sim.toggle_pause();
        assert_eq!(sim.run_state(), RunState::Paused);
        sim.toggle_pause();
        assert_eq!(sim.run_state(), RunState::Running);

        // resume from Running and pause from NotStarted are no-ops
        sim.resume();
        assert_eq!(sim.run_state(), RunState::Running);
        let (mut idle, _) = simulator(GameConfig::default());
        idle.pause();
        assert_eq!(idle.run_state(), RunState::NotStarted);
    }

    #[test]
    fn test_restart_resets_score_keeps_high_score() {
        let (mut sim, _) = started(GameConfig::default());
        let snake = sim.snake().unwrap().clone();
        assert!(sim.set_position(snake, Direction::Right, Cell::new(11, 10)));
        sim.tick();
        sim.request_direction(Direction::Up);
        for _ in 0..20 {
            sim.tick();
        }
        assert_eq!(sim.run_state(), RunState::GameOver);

        sim.start();
        assert_eq!(sim.run_state(), RunState::Running);
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.high_score(), 2);
        assert_eq!(sim.snake().unwrap().len(), 5);
        assert!(sim.game_over_reason().is_none());
    }

    #[test]
    fn test_high_score_loaded_once_and_only_raised() {
        let store = MemoryStore::new(5);
        let mut sim = SnakeSimulator::new(
            GameConfig::default().with_difficulty(DifficultyLevel::Easy),
            FoodPlacer::new(SequenceIndexSource::new([0])),
            store.clone(),
        );
        assert_eq!(sim.high_score(), 5);

        sim.start();
        let snake = sim.snake().unwrap().clone();
        assert!(sim.set_position(snake, Direction::Right, Cell::new(11, 10)));
        sim.tick();
        assert_eq!(sim.score(), 1);
        assert_eq!(sim.high_score(), 5);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_store_failure_does_not_abort_tick() {
        let mut sim = SnakeSimulator::new(
            GameConfig::default(),
            FoodPlacer::new(SequenceIndexSource::new([0])),
            FailingStore,
        );
        assert_eq!(sim.high_score(), 0);

        sim.start();
        let snake = sim.snake().unwrap().clone();
        assert!(sim.set_position(snake, Direction::Right, Cell::new(11, 10)));

        assert_eq!(sim.tick(), TickOutcome::Ate { points: 2 });
        assert_eq!(sim.high_score(), 2);
        assert_eq!(sim.run_state(), RunState::Running);
    }

    #[test]
    fn test_board_full_ends_game() {
        // 2x2 grid, snake fills three cells, food on the last one
        let config = GameConfig {
            grid_extent: 2,
            initial_length: 1,
            ..GameConfig::default()
        };
        let (mut sim, _) = started(config);
        let snake = Snake::from_cells(cells(&[(0, 1), (1, 1), (1, 0)])).unwrap();
        assert!(sim.set_position(snake, Direction::Up, Cell::new(0, 0)));

        assert_eq!(sim.tick(), TickOutcome::BoardFilled { points: 2 });
        assert_eq!(sim.run_state(), RunState::GameOver);
        assert_eq!(sim.game_over_reason(), Some(GameOverReason::BoardFull));
        assert_eq!(sim.score(), 2);
        assert_eq!(sim.snake().unwrap().len(), 4);
    }

    #[test]
    fn test_start_on_full_board_is_terminal() {
        let config = GameConfig {
            grid_extent: 1,
            initial_length: 1,
            ..GameConfig::default()
        };
        let (sim, _) = started(config);

        assert_eq!(sim.run_state(), RunState::GameOver);
        assert_eq!(sim.game_over_reason(), Some(GameOverReason::BoardFull));
    }

    #[test]
    fn test_change_difficulty() {
        let (mut sim, _) = started(GameConfig::default().with_difficulty(DifficultyLevel::Easy));
        assert_eq!(sim.tick_interval(), Duration::from_millis(125));

        sim.change_difficulty(DifficultyLevel::Hard);
        assert_eq!(sim.tick_interval(), DifficultyLevel::Hard.tick_interval());

        let snake = sim.snake().unwrap().clone();
        assert!(sim.set_position(snake, Direction::Right, Cell::new(11, 10)));
        assert_eq!(sim.tick(), TickOutcome::Ate { points: 3 });
    }

    #[test]
    fn test_set_position_rejects_broken_layouts() {
        let (mut idle, _) = simulator(GameConfig::default());
        let snake = Snake::new(Cell::new(5, 5), Direction::Right, 3);
        assert!(!idle.set_position(snake.clone(), Direction::Right, Cell::new(0, 0)));
        assert!(idle.snake().is_none());

        let (mut sim, _) = started(GameConfig::default());
        let before = sim.snapshot();

        // Food on the body
        assert!(!sim.set_position(snake.clone(), Direction::Right, Cell::new(4, 5)));
        // Food off the grid
        assert!(!sim.set_position(snake, Direction::Right, Cell::new(20, 0)));
        // Body off the grid
        let off_grid = Snake::new(Cell::new(1, 0), Direction::Right, 3);
        assert!(!sim.set_position(off_grid, Direction::Right, Cell::new(9, 9)));
        // Body folded onto itself
        let folded = Snake::from_cells(cells(&[(3, 3), (3, 4), (3, 3)])).unwrap();
        assert!(!sim.set_position(folded, Direction::Up, Cell::new(9, 9)));

        assert_eq!(sim.snapshot(), before);

        sim.pause();
        let snake = Snake::new(Cell::new(5, 5), Direction::Right, 3);
        assert!(sim.set_position(snake, Direction::Right, Cell::new(0, 0)));
        assert_eq!(sim.food(), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_step_counter_saturates() {
        let (mut sim, _) = started(GameConfig::default());
        sim.steps = u32::MAX;

        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert_eq!(sim.snapshot().steps, u32::MAX);
    }
}
