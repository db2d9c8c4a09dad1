//! App: terminal init, main loop, tick and key handling.

use crate::game::{Command, Session};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Gravity: one row per second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Options derived from CLI that affect how a session is created and drawn.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed seed for the piece generator; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub frame_rate: f64,
}

impl GameConfig {
    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_rate > 0.0 && self.frame_rate.is_finite()) {
            bail!("frame rate must be a positive number, got {}", self.frame_rate);
        }
        Ok(())
    }
}

pub struct App {
    session: Session,
    theme: Theme,
    last_tick: Instant,
    frame_interval: Duration,
}

impl App {
    pub fn new(config: &GameConfig, theme: Theme) -> Result<Self> {
        config.validate()?;
        let session = match config.seed {
            Some(seed) => Session::with_seed(seed),
            None => Session::new(),
        };
        Ok(Self {
            session,
            theme,
            last_tick: Instant::now(),
            frame_interval: Duration::from_secs_f64(1.0 / config.frame_rate),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Feed one key press into the session. `Break` means quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        let action = key_to_action(key);
        let command = match action {
            Action::Quit => return ControlFlow::Break(()),
            Action::Confirm if self.session.is_game_over() => Some(Command::Reset),
            Action::Confirm if self.session.is_paused() => Some(Command::TogglePause),
            other => other.command(),
        };
        if let Some(command) = command {
            debug!(?action, ?command, "key");
            self.session.apply(command);
        }
        ControlFlow::Continue(())
    }

    /// Apply a gravity tick if the interval has elapsed since the last one.
    fn tick_if_due(&mut self, now: Instant) {
        if now.duration_since(self.last_tick) >= TICK_INTERVAL {
            self.last_tick = now;
            self.session.apply(Command::Tick);
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        info!("game started");

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        terminal.show_cursor()?;
        info!(score = self.session.score(), "game closed");

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_tick = Instant::now();
        loop {
            terminal.draw(|f| crate::ui::draw(f, &self.session.snapshot(), &self.theme))?;

            let until_tick = TICK_INTERVAL.saturating_sub(self.last_tick.elapsed());
            let timeout = until_tick.min(self.frame_interval);

            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key).is_break() {
                            return Ok(());
                        }
                    }
                }
            }

            self.tick_if_due(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn app() -> App {
        let config = GameConfig {
            seed: Some(11),
            frame_rate: 30.0,
        };
        App::new(&config, Theme::default()).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> ControlFlow<()> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_bad_frame_rate_is_rejected() {
        for frame_rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let config = GameConfig {
                seed: Some(1),
                frame_rate,
            };
            assert!(config.validate().is_err(), "{frame_rate} accepted");
            assert!(App::new(&config, Theme::default()).is_err());
        }
    }

    #[test]
    fn test_quit_breaks() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')).is_break());
        assert!(press(&mut app, KeyCode::Left).is_continue());
    }

    #[test]
    fn test_enter_resumes_when_paused() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        assert!(app.session().is_paused());
        press(&mut app, KeyCode::Enter);
        assert!(!app.session().is_paused());
        // Enter during play does nothing.
        let piece = app.session().piece().cloned();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().piece(), piece.as_ref());
    }

    #[test]
    fn test_enter_plays_again_after_game_over() {
        let mut app = app();
        while !app.session().is_game_over() {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Enter);
        assert!(!app.session().is_game_over());
        assert_eq!(app.session().score(), 0);
        assert!(app.session().board().is_empty());
    }

    #[test]
    fn test_tick_waits_for_interval() {
        let mut app = app();
        let start = app.last_tick;
        let row = |app: &App| app.session().piece().map(|p| p.row);
        app.tick_if_due(start + TICK_INTERVAL / 2);
        assert_eq!(row(&app), Some(0));
        app.tick_if_due(start + TICK_INTERVAL);
        assert_eq!(row(&app), Some(1));
    }
}
