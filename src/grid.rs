//! Grid engine: active piece, gravity clock, input latch and the per-tick state machine.

use crate::board::Board;
use crate::collision::{self, Direction, MoveOutcome};
use crate::pieces::{self, Block, Shape};
use rand::Rng;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Rows per second without acceleration.
pub const NORMAL_SPEED: u32 = 1;
/// Rows per second while the soft-drop key is held.
pub const ACCELERATED_SPEED: u32 = 15;

const GRAVITY_BASE_MS: u64 = 1000;

/// Falling piece: shape, rotation (0..4) and the board position of its mask's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub shape: Shape,
    pub rotation: u8,
    pub row: i32,
    pub col: i32,
}

impl ActivePiece {
    /// New piece at the spawn anchor: top row, mask centred on a `cols`-wide board.
    pub fn spawn(shape: Shape, cols: usize) -> Self {
        Self {
            shape,
            rotation: 0,
            row: 0,
            col: cols as i32 / 2 - 2,
        }
    }

    /// Absolute cells, derived from (shape, rotation, origin) on every call.
    pub fn cells(&self) -> Vec<Block> {
        pieces::absolute_cells(self.shape, self.rotation, (self.row, self.col))
    }

    /// Same piece in the next rotation state, same origin.
    pub fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % pieces::ROTATIONS as u8,
            ..*self
        }
    }
}

const INTENT_NONE: u8 = 0;
const INTENT_LEFT: u8 = 1;
const INTENT_RIGHT: u8 = 2;

/// Player intents captured between ticks. Setters take `&self`, so an input source may hold a
/// shared reference while the engine consumes the values once per tick.
#[derive(Debug, Default)]
pub struct InputLatch {
    horizontal: AtomicU8,
    accelerated: AtomicBool,
    rotate: AtomicBool,
}

impl InputLatch {
    pub fn set_horizontal_intent(&self, dir: Option<Direction>) {
        let v = match dir {
            None => INTENT_NONE,
            Some(Direction::Left) => INTENT_LEFT,
            Some(Direction::Right) => INTENT_RIGHT,
        };
        self.horizontal.store(v, Ordering::Release);
    }

    #[cfg(test)]
    pub fn horizontal_intent(&self) -> Option<Direction> {
        decode_intent(self.horizontal.load(Ordering::Acquire))
    }

    fn take_horizontal_intent(&self) -> Option<Direction> {
        decode_intent(self.horizontal.swap(INTENT_NONE, Ordering::AcqRel))
    }

    /// Level-triggered: read every tick, never consumed.
    pub fn set_accelerated(&self, on: bool) {
        self.accelerated.store(on, Ordering::Release);
    }

    pub fn is_accelerated(&self) -> bool {
        self.accelerated.load(Ordering::Acquire)
    }

    /// Edge-triggered; repeated requests before the next tick collapse into one.
    pub fn request_rotate(&self) {
        self.rotate.store(true, Ordering::Release);
    }

    fn take_rotate_request(&self) -> bool {
        self.rotate.swap(false, Ordering::AcqRel)
    }

    fn clear(&self) {
        self.horizontal.store(INTENT_NONE, Ordering::Release);
        self.accelerated.store(false, Ordering::Release);
        self.rotate.store(false, Ordering::Release);
    }
}

fn decode_intent(v: u8) -> Option<Direction> {
    match v {
        INTENT_LEFT => Some(Direction::Left),
        INTENT_RIGHT => Some(Direction::Right),
        _ => None,
    }
}

/// What one call to [`Grid::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The stack reached the top on this tick. Reported once.
    GameOver,
    /// The game was already over; nothing ran.
    Halted,
    /// A normal tick; `cleared_rows` goes to the score tracker.
    Advanced { cleared_rows: u32 },
}

/// Owns the board and the falling piece and advances them one tick at a time.
#[derive(Debug)]
pub struct Grid<R = StdRng> {
    board: Board,
    current: ActivePiece,
    next: Shape,
    gravity_clock: Duration,
    input: InputLatch,
    game_over: bool,
    rng: R,
}

impl<R: Rng> Grid<R> {
    /// # Panics
    ///
    /// Panics if `cols < 4` (the spawn anchor needs room for a 4-wide mask) or `rows == 0`.
    pub fn new(rows: usize, cols: usize, mut rng: R) -> Self {
        assert!(cols >= pieces::MASK_SIZE, "board needs at least 4 columns, got {cols}");
        let board = Board::new(rows, cols);
        let current = ActivePiece::spawn(pieces::random_shape(&mut rng), cols);
        let next = pieces::random_shape(&mut rng);
        Self {
            board,
            current,
            next,
            gravity_clock: Duration::ZERO,
            input: InputLatch::default(),
            game_over: false,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut_for_test(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub fn active(&self) -> &ActivePiece {
        &self.current
    }

    pub fn next_shape(&self) -> Shape {
        self.next
    }

    #[cfg(test)]
    pub fn input(&self) -> &InputLatch {
        &self.input
    }

    #[cfg(test)]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_horizontal_intent(&self, dir: Option<Direction>) {
        self.input.set_horizontal_intent(dir);
    }

    pub fn set_accelerated(&self, on: bool) {
        self.input.set_accelerated(on);
    }

    pub fn request_rotate(&self) {
        self.input.request_rotate();
    }

    /// Gravity period for the current acceleration state.
    pub fn gravity_interval(&self) -> Duration {
        let speed = if self.input.is_accelerated() {
            ACCELERATED_SPEED
        } else {
            NORMAL_SPEED
        };
        Duration::from_millis(GRAVITY_BASE_MS / u64::from(speed))
    }

    /// Advances rotation if the next state fits; otherwise the request is dropped.
    pub fn rotate_tile(&mut self) -> bool {
        if collision::can_rotate(&self.board, &self.current) {
            self.current = self.current.rotated();
            true
        } else {
            false
        }
    }

    /// One simulation step. Order: loss check, latched rotation, gravity, horizontal intent,
    /// row sweep.
    pub fn tick(&mut self, elapsed: Duration) -> Tick {
        if self.game_over {
            return Tick::Halted;
        }
        if collision::has_player_lost(&self.board) {
            self.game_over = true;
            info!("stack reached the top row, game over");
            return Tick::GameOver;
        }

        if self.input.take_rotate_request() {
            self.rotate_tile();
        }

        self.gravity_clock += elapsed;
        if self.gravity_clock > self.gravity_interval() {
            self.gravity_step();
            self.gravity_clock = Duration::ZERO;
        }

        if let Some(dir) = self.input.take_horizontal_intent() {
            match collision::can_move_horizontally(&self.board, &self.current, dir) {
                MoveOutcome::Allowed => self.current.col += dir.delta(),
                MoveOutcome::BlockedByBlock => self.lock_and_spawn(),
                MoveOutcome::BlockedByWall => {}
            }
        }

        let cleared_rows = self.clear_full_rows();
        Tick::Advanced { cleared_rows }
    }

    /// Moves the piece down one row, or locks it when it cannot descend. Returns whether it
    /// moved.
    fn gravity_step(&mut self) -> bool {
        if collision::can_descend(&self.board, &self.current) {
            self.current.row += 1;
            true
        } else {
            self.lock_and_spawn();
            false
        }
    }

    fn lock_and_spawn(&mut self) {
        let cells = self.current.cells();
        debug!(
            shape = ?self.current.shape,
            rotation = self.current.rotation,
            row = self.current.row,
            col = self.current.col,
            "lock"
        );
        self.board.settle(&cells);
        self.current = ActivePiece::spawn(self.next, self.board.cols());
        self.next = pieces::random_shape(&mut self.rng);
        self.gravity_clock = Duration::ZERO;
    }

    /// Clears every full row top to bottom. A cleared row pulls the rows above it down, so
    /// the scan continues at the next index without revisiting.
    fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        for row in 0..self.board.rows() {
            if self.board.is_row_full(row) {
                self.board.clear_row(row);
                cleared += 1;
            }
        }
        if cleared > 0 {
            debug!(rows = cleared, "rows cleared");
        }
        cleared
    }

    /// Empty board, fresh pieces, cleared input; used on restart.
    pub fn reset(&mut self) {
        self.board.reset();
        self.current = ActivePiece::spawn(pieces::random_shape(&mut self.rng), self.board.cols());
        self.next = pieces::random_shape(&mut self.rng);
        self.gravity_clock = Duration::ZERO;
        self.input.clear();
        self.game_over = false;
    }

    pub fn current_tile_blocks(&self) -> Vec<Block> {
        self.current.cells()
    }

    pub fn settled_blocks(&self) -> Vec<Block> {
        self.board.settled_blocks()
    }

    /// Next piece in rotation 0, relative to a (0, 0) origin for the preview panel.
    pub fn next_tile_blocks(&self) -> Vec<Block> {
        pieces::absolute_cells(self.next, 0, (0, 0))
    }
}
