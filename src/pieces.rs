//! Piece catalog: the seven tetrominoes and their four rotation masks.

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};

/// Side length of the square occupancy mask every rotation state lives in.
pub const MASK_SIZE: usize = 4;

/// Number of rotation states per shape.
pub const ROTATIONS: usize = 4;

/// Occupancy of one rotation state, indexed `[row][col]`.
pub type Mask = [[bool; MASK_SIZE]; MASK_SIZE];

/// One settled or falling cell in board coordinates, with the colour tag of its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub row: i32,
    pub col: i32,
    pub color: u8,
}

/// Tetromino shapes (O, T, I, J, L, S, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    O,
    T,
    I,
    J,
    L,
    S,
    Z,
}

impl Shape {
    /// Catalog order; stable across runs.
    pub const ALL: [Self; 7] = [Self::O, Self::T, Self::I, Self::J, Self::L, Self::S, Self::Z];

    /// Colour index 0..7 into `Theme::piece_color`.
    pub fn color_index(self) -> u8 {
        match self {
            Self::O => 0, // Yellow
            Self::T => 1, // Magenta
            Self::I => 2, // Cyan
            Self::J => 3, // Blue
            Self::L => 4, // Orange
            Self::S => 5, // Green
            Self::Z => 6, // Red
        }
    }

    fn masks(self) -> &'static [Mask; ROTATIONS] {
        match self {
            Self::O => &O_MASKS,
            Self::T => &T_MASKS,
            Self::I => &I_MASKS,
            Self::J => &J_MASKS,
            Self::L => &L_MASKS,
            Self::S => &S_MASKS,
            Self::Z => &Z_MASKS,
        }
    }
}

impl Distribution<Shape> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        let shapes = all_shapes();
        shapes[rng.random_range(0..shapes.len())]
    }
}

const X: bool = true;
const E: bool = false;

const O_MASKS: [Mask; ROTATIONS] = [
    [[E, X, X, E], [E, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, X, E], [E, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, X, E], [E, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, X, E], [E, X, X, E], [E, E, E, E], [E, E, E, E]],
];

const T_MASKS: [Mask; ROTATIONS] = [
    [[X, X, X, E], [E, X, E, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, E, E], [X, X, E, E], [E, X, E, E], [E, E, E, E]],
    [[E, X, E, E], [X, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, E, E], [E, X, X, E], [E, X, E, E], [E, E, E, E]],
];

const I_MASKS: [Mask; ROTATIONS] = [
    [[E, X, E, E], [E, X, E, E], [E, X, E, E], [E, X, E, E]],
    [[E, E, E, E], [X, X, X, X], [E, E, E, E], [E, E, E, E]],
    [[E, X, E, E], [E, X, E, E], [E, X, E, E], [E, X, E, E]],
    [[E, E, E, E], [X, X, X, X], [E, E, E, E], [E, E, E, E]],
];

const J_MASKS: [Mask; ROTATIONS] = [
    [[E, E, X, E], [E, E, X, E], [E, X, X, E], [E, E, E, E]],
    [[X, E, E, E], [X, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, X, E], [E, X, E, E], [E, X, E, E], [E, E, E, E]],
    [[X, X, X, E], [E, E, X, E], [E, E, E, E], [E, E, E, E]],
];

const L_MASKS: [Mask; ROTATIONS] = [
    [[E, X, E, E], [E, X, E, E], [E, X, X, E], [E, E, E, E]],
    [[X, X, X, E], [X, E, E, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, X, E], [E, E, X, E], [E, E, X, E], [E, E, E, E]],
    [[E, E, E, X], [E, X, X, X], [E, E, E, E], [E, E, E, E]],
];

const S_MASKS: [Mask; ROTATIONS] = [
    [[E, X, X, E], [X, X, E, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, E, E], [E, X, X, E], [E, E, X, E], [E, E, E, E]],
    [[E, X, X, E], [X, X, E, E], [E, E, E, E], [E, E, E, E]],
    [[E, X, E, E], [E, X, X, E], [E, E, X, E], [E, E, E, E]],
];

const Z_MASKS: [Mask; ROTATIONS] = [
    [[X, X, E, E], [E, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, E, X, E], [E, X, X, E], [E, X, E, E], [E, E, E, E]],
    [[X, X, E, E], [E, X, X, E], [E, E, E, E], [E, E, E, E]],
    [[E, E, X, E], [E, X, X, E], [E, X, E, E], [E, E, E, E]],
];

/// All seven shapes in catalog order.
pub fn all_shapes() -> [Shape; 7] {
    Shape::ALL
}

/// Uniform draw over the seven shapes. Every call is independent (no bag).
pub fn random_shape<R: Rng + ?Sized>(rng: &mut R) -> Shape {
    rng.random()
}

/// Occupancy mask of `shape` in rotation state `rotation`.
///
/// # Panics
///
/// Panics if `rotation` is not in `0..4`; callers keep rotation wrapped.
pub fn occupancy_mask(shape: Shape, rotation: u8) -> &'static Mask {
    assert!(
        (rotation as usize) < ROTATIONS,
        "rotation must be between 0 and 3, got {rotation}"
    );
    &shape.masks()[rotation as usize]
}

/// Board cells covered by `shape` at `rotation` with the mask's top-left corner at `origin`
/// (row, col). Scans the mask row-major, so the order is stable.
pub fn absolute_cells(shape: Shape, rotation: u8, origin: (i32, i32)) -> Vec<Block> {
    let mask = occupancy_mask(shape, rotation);
    let color = shape.color_index();
    let mut out = Vec::with_capacity(4);
    for (r, row) in mask.iter().enumerate() {
        for (c, &filled) in row.iter().enumerate() {
            if filled {
                out.push(Block {
                    row: origin.0 + r as i32,
                    col: origin.1 + c as i32,
                    color,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_rotation_has_four_cells() {
        for shape in all_shapes() {
            for rotation in 0..ROTATIONS as u8 {
                let count = occupancy_mask(shape, rotation)
                    .iter()
                    .flatten()
                    .filter(|&&c| c)
                    .count();
                assert_eq!(count, 4, "{:?} rotation {}", shape, rotation);
            }
        }
    }

    #[test]
    fn occupancy_mask_is_pure() {
        for shape in all_shapes() {
            for rotation in 0..4 {
                assert_eq!(
                    occupancy_mask(shape, rotation),
                    occupancy_mask(shape, rotation)
                );
            }
        }
    }

    #[test]
    #[should_panic(expected = "rotation must be between 0 and 3")]
    fn occupancy_mask_rejects_rotation_four() {
        let _ = occupancy_mask(Shape::T, 4);
    }

    #[test]
    fn catalog_order_is_fixed() {
        assert_eq!(
            all_shapes(),
            [Shape::O, Shape::T, Shape::I, Shape::J, Shape::L, Shape::S, Shape::Z]
        );
        let colors: Vec<u8> = all_shapes().iter().map(|s| s.color_index()).collect();
        assert_eq!(colors, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn absolute_cells_offsets_by_origin() {
        let cells = absolute_cells(Shape::I, 0, (3, 5));
        let coords: Vec<(i32, i32)> = cells.iter().map(|b| (b.row, b.col)).collect();
        assert_eq!(coords, vec![(3, 6), (4, 6), (5, 6), (6, 6)]);
        assert!(cells.iter().all(|b| b.color == Shape::I.color_index()));

        let cells = absolute_cells(Shape::I, 1, (-1, 0));
        let coords: Vec<(i32, i32)> = cells.iter().map(|b| (b.row, b.col)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
    }

    #[test]
    fn random_shape_covers_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(random_shape(&mut rng));
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn random_shape_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(random_shape(&mut a), random_shape(&mut b));
        }
    }
}
