//! Collision queries over the board and the active piece. Read-only; nothing here mutates.

use crate::board::Board;
use crate::grid::ActivePiece;

/// Horizontal direction of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub fn delta(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Result of a horizontal move query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Allowed,
    /// A shifted cell would leave the board on the left or right.
    BlockedByWall,
    /// A shifted cell would overlap a settled block.
    BlockedByBlock,
}

/// True if every cell of the piece has an in-bounds, empty cell directly below it.
pub fn can_descend(board: &Board, piece: &ActivePiece) -> bool {
    piece
        .cells()
        .iter()
        .all(|b| !board.is_occupied(b.row + 1, b.col))
}

/// Checks each cell in mask order; the first violation decides. Within a cell the settled
/// block check runs before the wall check.
pub fn can_move_horizontally(board: &Board, piece: &ActivePiece, dir: Direction) -> MoveOutcome {
    let cols = board.cols() as i32;
    for b in piece.cells() {
        let col = b.col + dir.delta();
        if board.get(b.row, col).is_some_and(|c| c.is_filled()) {
            return MoveOutcome::BlockedByBlock;
        }
        if col < 0 || col >= cols {
            return MoveOutcome::BlockedByWall;
        }
    }
    MoveOutcome::Allowed
}

/// Tests the next rotation state at the same origin (no kicks). Cells may poke above row 0;
/// left, right and bottom bounds and settled blocks reject.
pub fn can_rotate(board: &Board, piece: &ActivePiece) -> bool {
    let cols = board.cols() as i32;
    let rows = board.rows() as i32;
    piece.rotated().cells().iter().all(|b| {
        if b.col < 0 || b.col >= cols || b.row >= rows {
            return false;
        }
        b.row < 0 || !board.is_occupied(b.row, b.col)
    })
}

/// True once any settled block reaches the top visible row.
pub fn has_player_lost(board: &Board) -> bool {
    board.row_has_blocks(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fill_row;
    use crate::pieces::{Block, Shape};

    fn piece(shape: Shape, rotation: u8, row: i32, col: i32) -> ActivePiece {
        ActivePiece {
            shape,
            rotation,
            row,
            col,
        }
    }

    fn settle_at(board: &mut Board, row: i32, col: i32) {
        board.settle(&[Block { row, col, color: 0 }]);
    }

    #[test]
    fn descend_stops_at_floor() {
        let board = Board::default();
        // I rotation 0 is vertical in mask column 1, rows 0..4.
        assert!(can_descend(&board, &piece(Shape::I, 0, 15, 4)));
        assert!(!can_descend(&board, &piece(Shape::I, 0, 16, 4)));
    }

    #[test]
    fn descend_stops_on_settled_block() {
        let mut board = Board::default();
        settle_at(&mut board, 10, 5);
        assert!(can_descend(&board, &piece(Shape::I, 0, 5, 4)));
        assert!(!can_descend(&board, &piece(Shape::I, 0, 6, 4)));
    }

    #[test]
    fn left_wall_reports_wall_not_block() {
        let board = Board::default();
        // I vertical occupies mask column 1, so origin col -1 puts it at board column 0.
        let p = piece(Shape::I, 0, 3, -1);
        assert_eq!(p.cells()[0].col, 0);
        assert_eq!(
            can_move_horizontally(&board, &p, Direction::Left),
            MoveOutcome::BlockedByWall
        );
        assert_eq!(
            can_move_horizontally(&board, &p, Direction::Right),
            MoveOutcome::Allowed
        );
    }

    #[test]
    fn right_wall_reports_wall() {
        let board = Board::default();
        // O occupies mask columns 1..=2; origin col 9 puts its right edge at column 11.
        let p = piece(Shape::O, 0, 0, 9);
        assert_eq!(
            can_move_horizontally(&board, &p, Direction::Right),
            MoveOutcome::BlockedByWall
        );
    }

    #[test]
    fn settled_neighbour_reports_block() {
        let mut board = Board::default();
        settle_at(&mut board, 5, 4);
        let p = piece(Shape::I, 0, 3, 4); // column 5, rows 3..=6
        assert_eq!(
            can_move_horizontally(&board, &p, Direction::Left),
            MoveOutcome::BlockedByBlock
        );
        assert_eq!(
            can_move_horizontally(&board, &p, Direction::Right),
            MoveOutcome::Allowed
        );
    }

    #[test]
    fn first_violation_in_scan_order_wins() {
        let mut board = Board::default();
        // T rotation 3 at origin (4, 9) covers (4,10) (5,10) (5,11) (6,10). Moving right, the
        // first scanned cell runs into (4,11) before (5,11) would cross the wall.
        settle_at(&mut board, 4, 11);
        let p = piece(Shape::T, 3, 4, 9);
        assert_eq!(
            can_move_horizontally(&board, &p, Direction::Right),
            MoveOutcome::BlockedByBlock
        );
    }

    #[test]
    fn rotation_blocked_by_wall_and_floor() {
        let board = Board::default();
        // Vertical I at column 11 (origin -> col 10); next state is horizontal cols 10..=13.
        assert!(!can_rotate(&board, &piece(Shape::I, 0, 5, 10)));
        // Vertical I at column 0 (origin col -1); horizontal would span -1..=2.
        assert!(!can_rotate(&board, &piece(Shape::I, 0, 5, -1)));
        // T rotation 0 -> 1 has three rows; at origin row 18 the third row is row 20.
        assert!(!can_rotate(&board, &piece(Shape::T, 0, 18, 4)));
        assert!(can_rotate(&board, &piece(Shape::T, 0, 17, 4)));
    }

    #[test]
    fn rotation_blocked_by_settled_cell() {
        let mut board = Board::default();
        // I rotation 1 at origin (4, 4) covers row 5, columns 4..=7.
        settle_at(&mut board, 5, 6);
        assert!(!can_rotate(&board, &piece(Shape::I, 0, 4, 4)));
        assert!(can_rotate(&board, &piece(Shape::I, 0, 8, 4)));
    }

    #[test]
    fn rotation_may_extend_above_the_top() {
        let board = Board::default();
        // I rotation 1 at origin row -1 covers row 0 only; rotation 2 covers rows -1..=2.
        assert!(can_rotate(&board, &piece(Shape::I, 1, -1, 4)));
    }

    #[test]
    fn loss_detection_top_row_only() {
        let mut board = Board::default();
        assert!(!has_player_lost(&board));
        settle_at(&mut board, 1, 3);
        assert!(!has_player_lost(&board));

        let mut board = Board::default();
        settle_at(&mut board, 0, 3);
        assert!(has_player_lost(&board));
    }

    #[test]
    fn full_bottom_rows_do_not_lose() {
        let mut board = Board::default();
        for row in 1..20 {
            fill_row(&mut board, row, 2);
        }
        assert!(!has_player_lost(&board));
    }
}
