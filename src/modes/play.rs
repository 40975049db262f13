use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};

use super::schedule::TickSchedule;
use crate::game::{RunState, SnakeSimulator};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Interactive terminal session: owns the tick timer and feeds keyboard
/// input to the simulator.
pub struct PlayMode {
    simulator: SnakeSimulator,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    schedule: TickSchedule,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(simulator: SnakeSimulator) -> Self {
        Self {
            simulator,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            schedule: TickSchedule::new(),
            should_quit: false,
        }
    }

    pub fn simulator(&self) -> &SnakeSimulator {
        &self.simulator
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            "Session ended: games={} high_score={}",
            self.metrics.games_played,
            self.simulator.high_score()
        );

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer: Option<Interval> = None;

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            if let Some(period) = self.sync_schedule() {
                tick_timer = period.map(tick_interval);
            }

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick, only armed while running
                _ = next_tick(&mut tick_timer) => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let snapshot = self.simulator.snapshot();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snapshot, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Bring the schedule in line with the simulator. Returns the new period
    /// when the host timer must be rebuilt.
    fn sync_schedule(&mut self) -> Option<Option<Duration>> {
        self.schedule
            .update(self.simulator.run_state(), self.simulator.difficulty())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.apply(action);
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Steer(direction) => {
                self.simulator.request_direction(direction);
            }
            KeyAction::StartOrPause => match self.simulator.run_state() {
                RunState::NotStarted | RunState::GameOver => self.start_game(),
                RunState::Running => {
                    self.simulator.pause();
                    self.metrics.on_pause();
                }
                RunState::Paused => {
                    self.simulator.resume();
                    self.metrics.on_resume();
                }
            },
            KeyAction::Restart => self.start_game(),
            KeyAction::SetDifficulty(level) => self.simulator.change_difficulty(level),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        let outcome = self.simulator.tick();

        if outcome.is_terminal() {
            self.metrics.on_game_over();
        }
    }

    fn start_game(&mut self) {
        if matches!(
            self.simulator.run_state(),
            RunState::Running | RunState::Paused
        ) {
            // Abandoned game still counts as played
            self.metrics.on_game_over();
        }
        self.simulator.start();
        self.metrics.on_game_start();
        if self.simulator.run_state() == RunState::GameOver {
            self.metrics.on_game_over();
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Timer whose first tick fires one full period from now
fn tick_interval(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
