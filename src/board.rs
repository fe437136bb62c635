//! Board: fixed grid of settled cells. Row 0 is the top visible row.

use crate::pieces::Block;
use std::collections::VecDeque;
use tracing::warn;

/// Rows in the reference configuration.
pub const DEFAULT_ROWS: usize = 20;
/// Columns in the reference configuration.
pub const DEFAULT_COLS: usize = 12;

/// Single settled cell: empty or occupied by a block of the given colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(u8),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Settled blocks only; the active piece is never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// cells[row][col]; cells[0] is the top row.
    cells: VecDeque<Vec<Cell>>,
}

impl Board {
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "board dimensions must be positive, got {rows}x{cols}");
        let cells = (0..rows).map(|_| vec![Cell::Empty; cols]).collect();
        Self { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Cell at (row, col), or `None` outside the grid.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        self.index(row, col).map(|(r, c)| self.cells[r][c])
    }

    /// True for settled cells and for every coordinate outside the grid, so edges block
    /// exactly like settled blocks do.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_none_or(Cell::is_filled)
    }

    /// Marks each block as occupied. Out-of-range blocks are skipped and logged.
    pub fn settle(&mut self, blocks: &[Block]) {
        for block in blocks {
            match self.index(block.row, block.col) {
                Some((r, c)) => self.cells[r][c] = Cell::Filled(block.color),
                None => warn!(
                    row = block.row,
                    col = block.col,
                    "settle: block outside the board, skipped"
                ),
            }
        }
    }

    /// True iff every column of `row` is occupied. Out-of-range rows are never full.
    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|r| r.iter().all(|c| c.is_filled()))
    }

    /// Removes `row` and shifts every row above it down by one; a fresh empty row appears
    /// at the top.
    pub fn clear_row(&mut self, row: usize) {
        if row >= self.rows {
            return;
        }
        self.cells.remove(row);
        self.cells.push_front(vec![Cell::Empty; self.cols]);
    }

    /// Empties every cell.
    pub fn reset(&mut self) {
        for row in &mut self.cells {
            row.fill(Cell::Empty);
        }
    }

    /// All settled cells as blocks, top to bottom, left to right.
    pub fn settled_blocks(&self) -> Vec<Block> {
        let mut out = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Cell::Filled(color) = *cell {
                    out.push(Block {
                        row: r as i32,
                        col: c as i32,
                        color,
                    });
                }
            }
        }
        out
    }

    /// Number of occupied cells.
    #[cfg(test)]
    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|c| c.is_filled()).count())
            .sum()
    }

    /// True if any settled cell sits in `row`.
    pub fn row_has_blocks(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|r| r.iter().any(|c| c.is_filled()))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

#[cfg(test)]
pub(crate) fn fill_row(board: &mut Board, row: usize, color: u8) {
    let blocks: Vec<Block> = (0..board.cols() as i32)
        .map(|col| Block {
            row: row as i32,
            col,
            color,
        })
        .collect();
    board.settle(&blocks);
}
