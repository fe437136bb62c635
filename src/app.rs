//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::collision::Direction;
use crate::grid::Grid;
use crate::highscores::HighScoreStore;
use crate::input::{Action, key_to_action};
use crate::session::{Phase, Session, SessionEvent};
use crate::theme::Theme;
use crate::ui::{self, GameOverFade};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Without release events, soft drop ends when the key has not repeated for this long.
const SOFT_DROP_RELEASE_MS: u64 = 150;

type Store = Box<dyn HighScoreStore>;

pub struct App {
    session: Session<StdRng, Store>,
    theme: Theme,
    fade: GameOverFade,
    frame_duration: Duration,
    last_tick: Instant,
    /// Last press or repeat of the soft-drop key while it is held.
    soft_drop_seen: Option<Instant>,
    /// Terminal reports key releases (keyboard enhancement accepted).
    release_events: bool,
}

impl App {
    pub fn new(config: &GameConfig, theme: Theme, store: Store) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = Grid::new(config.rows, config.cols, rng);
        let mut session = Session::new(grid, store);
        if config.no_menu {
            session.start();
        }
        info!(
            rows = config.rows,
            cols = config.cols,
            fps = config.fps,
            best = session.score().high_score(),
            "session ready"
        );
        Ok(Self {
            session,
            theme,
            fade: GameOverFade::default(),
            frame_duration: Duration::from_secs_f64(1.0 / f64::from(config.fps.max(1))),
            last_tick: Instant::now(),
            soft_drop_seen: None,
            release_events: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
                PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                supports_keyboard_enhancement,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Release events are optional; soft drop falls back to a repeat timeout.
        let enhanced = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        self.release_events = enhanced;
        debug!(enhanced, "keyboard enhancement");

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        if enhanced {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_tick = Instant::now();
        loop {
            let now = Instant::now();
            self.expire_soft_drop(now);

            let elapsed = now.saturating_duration_since(self.last_tick);
            self.last_tick = now;
            if let Some(event) = self.session.tick(elapsed) {
                self.on_session_event(event);
            }

            terminal.draw(|f| ui::draw(f, &self.session, &self.theme, &mut self.fade, now))?;

            // Sleep out the rest of the frame while waiting for input.
            let timeout = self.frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::RowsCleared { rows } => {
                debug!(rows, score = self.session.score().score(), "cleared");
            }
            SessionEvent::GameOver { score } => {
                self.soft_drop_seen = None;
                info!(score, "game over screen");
            }
        }
    }

    /// Returns true when the player asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(key);
        let grid = self.session.grid();

        if key.kind == KeyEventKind::Release {
            if action == Action::SoftDrop {
                grid.set_accelerated(false);
                self.soft_drop_seen = None;
            }
            return false;
        }
        let repeat = key.kind == KeyEventKind::Repeat;

        match action {
            Action::Quit => return true,
            Action::Pause if !repeat => self.session.toggle_pause(),
            Action::Start if !repeat => self.start(),
            _ if self.session.phase() != Phase::Playing => {}
            Action::MoveLeft => grid.set_horizontal_intent(Some(Direction::Left)),
            Action::MoveRight => grid.set_horizontal_intent(Some(Direction::Right)),
            Action::Rotate if !repeat => grid.request_rotate(),
            Action::SoftDrop => {
                grid.set_accelerated(true);
                self.soft_drop_seen = Some(Instant::now());
            }
            _ => {}
        }
        false
    }

    /// Enter starts from the title and restarts once the game-over fade has finished.
    fn start(&mut self) {
        match self.session.phase() {
            Phase::NewGame => {}
            Phase::GameOver { .. } if self.fade.is_done() => {}
            _ => return,
        }
        self.fade.reset();
        self.soft_drop_seen = None;
        self.session.start();
        self.last_tick = Instant::now();
    }

    fn expire_soft_drop(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        let Some(seen) = self.soft_drop_seen else {
            return;
        };
        if now.saturating_duration_since(seen) >= Duration::from_millis(SOFT_DROP_RELEASE_MS) {
            self.session.grid().set_accelerated(false);
            self.soft_drop_seen = None;
        }
    }
}
