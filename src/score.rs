//! Score tracker: classic line-clear scoring, level and the persisted best score.

use crate::highscores::HighScoreStore;
use tracing::{debug, info, warn};

/// Base points for clearing 1, 2, 3 or 4 rows in a single tick.
pub const LINE_SCORES: [u32; 4] = [40, 100, 300, 1200];

/// Rows per level step.
pub const ROWS_PER_LEVEL: u32 = 10;

#[derive(Debug)]
pub struct ScoreTracker<S> {
    score: u32,
    total_cleared_rows: u32,
    high_score: u32,
    store: S,
}

impl<S: HighScoreStore> ScoreTracker<S> {
    /// Loads the best score from `store`. A failing store starts from 0.
    pub fn new(store: S) -> Self {
        let high_score = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load high score, starting from 0");
            0
        });
        Self {
            score: 0,
            total_cleared_rows: 0,
            high_score,
            store,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn total_cleared_rows(&self) -> u32 {
        self.total_cleared_rows
    }

    /// 1 until ten rows are cleared, then one more per ten.
    pub fn level(&self) -> u32 {
        self.total_cleared_rows / ROWS_PER_LEVEL + 1
    }

    /// Adds points for `n` rows cleared in one tick, at the level in effect before they count.
    /// Any `n` outside 1..=4 changes nothing.
    pub fn apply_cleared_rows(&mut self, n: u32) {
        let Some(&base) = (n as usize)
            .checked_sub(1)
            .and_then(|i| LINE_SCORES.get(i))
        else {
            return;
        };
        let points = base * self.level();
        self.score = self.score.saturating_add(points);
        self.total_cleared_rows += n;
        info!(
            rows = n,
            points,
            score = self.score,
            level = self.level(),
            "rows cleared"
        );

        if self.score > self.high_score {
            self.high_score = self.score;
            debug!(best = self.high_score, "new high score");
            if let Err(e) = self.store.save(self.high_score) {
                warn!(error = %e, "could not save high score");
            }
        }
    }

    /// New game: score and row count back to zero. The best score stays.
    pub fn reset(&mut self) {
        self.score = 0;
        self.total_cleared_rows = 0;
    }
}
