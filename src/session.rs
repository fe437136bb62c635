//! Session: game phases around the grid engine and score tracker.

use crate::grid::{Grid, Tick};
use crate::highscores::HighScoreStore;
use crate::score::ScoreTracker;
use rand::Rng;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player to start.
    NewGame,
    Playing,
    Paused,
    GameOver { final_score: u32 },
}

/// Something the shell may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    RowsCleared { rows: u32 },
    GameOver { score: u32 },
}

#[derive(Debug)]
pub struct Session<R, S> {
    grid: Grid<R>,
    score: ScoreTracker<S>,
    phase: Phase,
}

impl<R: Rng, S: HighScoreStore> Session<R, S> {
    pub fn new(grid: Grid<R>, store: S) -> Self {
        Self {
            grid,
            score: ScoreTracker::new(store),
            phase: Phase::NewGame,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn grid(&self) -> &Grid<R> {
        &self.grid
    }

    pub fn score(&self) -> &ScoreTracker<S> {
        &self.score
    }

    /// Begins a fresh game from `NewGame` or `GameOver`. Ignored while playing or paused.
    pub fn start(&mut self) {
        if matches!(self.phase, Phase::Playing | Phase::Paused) {
            return;
        }
        self.grid.reset();
        self.score.reset();
        self.phase = Phase::Playing;
        info!(best = self.score.high_score(), "new game");
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            other => other,
        };
    }

    /// Runs one engine tick while playing. Elapsed time outside `Playing` is dropped, so the
    /// gravity clock does not run while paused.
    pub fn tick(&mut self, elapsed: Duration) -> Option<SessionEvent> {
        if self.phase != Phase::Playing {
            return None;
        }
        match self.grid.tick(elapsed) {
            Tick::Advanced { cleared_rows: 0 } | Tick::Halted => None,
            Tick::Advanced { cleared_rows } => {
                self.score.apply_cleared_rows(cleared_rows);
                Some(SessionEvent::RowsCleared { rows: cleared_rows })
            }
            Tick::GameOver => {
                let score = self.score.score();
                self.phase = Phase::GameOver { final_score: score };
                info!(score, best = self.score.high_score(), "game over");
                Some(SessionEvent::GameOver { score })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fill_row;
    use crate::highscores::MemoryHighScores;
    use crate::pieces::Block;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session() -> Session<StdRng, MemoryHighScores> {
        Session::new(
            Grid::new(20, 12, StdRng::seed_from_u64(3)),
            MemoryHighScores::with_score(500),
        )
    }

    const STEP: Duration = Duration::from_millis(16);

    #[test]
    fn starts_waiting_and_ignores_ticks() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::NewGame);
        assert_eq!(s.tick(Duration::from_secs(5)), None);
        assert_eq!(s.grid().active().row, 0);
        assert_eq!(s.score().high_score(), 500);
    }

    #[test]
    fn pause_freezes_gravity() {
        let mut s = session();
        s.start();
        s.toggle_pause();
        assert_eq!(s.phase(), Phase::Paused);
        s.tick(Duration::from_secs(3));
        assert_eq!(s.grid().active().row, 0);
        s.toggle_pause();
        assert_eq!(s.phase(), Phase::Playing);
        s.tick(Duration::from_millis(1001));
        assert_eq!(s.grid().active().row, 1);
    }

    #[test]
    fn cleared_rows_reach_the_score() {
        let mut s = session();
        s.start();
        fill_row(s.grid.board_mut_for_test(), 19, 1);
        assert_eq!(s.tick(STEP), Some(SessionEvent::RowsCleared { rows: 1 }));
        assert_eq!(s.score().score(), 40);
        assert_eq!(s.score().total_cleared_rows(), 1);
    }

    #[test]
    fn game_over_is_reported_once_then_restart_keeps_best() {
        let mut s = session();
        s.start();
        fill_row(s.grid.board_mut_for_test(), 19, 1);
        s.tick(STEP);
        s.grid.board_mut_for_test().settle(&[Block {
            row: 0,
            col: 0,
            color: 2,
        }]);

        assert_eq!(s.tick(STEP), Some(SessionEvent::GameOver { score: 40 }));
        assert_eq!(s.phase(), Phase::GameOver { final_score: 40 });
        assert_eq!(s.tick(STEP), None);
        s.toggle_pause();
        assert_eq!(s.phase(), Phase::GameOver { final_score: 40 });

        s.start();
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.score().score(), 0);
        assert_eq!(s.score().high_score(), 500);
        assert_eq!(s.grid().board().occupied_count(), 0);
    }

    #[test]
    fn start_is_ignored_mid_game() {
        let mut s = session();
        s.start();
        s.tick(Duration::from_millis(1001));
        s.start();
        assert_eq!(s.grid().active().row, 1);
    }
}
