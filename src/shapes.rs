//! Shape catalog, falling pieces and the piece factory.
//!
//! Templates are static data. Every piece owns a private copy of its template
//! matrix, so rotating a piece never touches the catalog or any other piece.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::COLS;

// ============================================================================
// Shape Catalog
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ShapeKind {
    I,
    O,
    T,
    J,
    L,
    S,
    Z,
}

pub struct Template {
    pub cells: &'static [&'static [u8]],
    pub color: Color,
}

static I_TEMPLATE: Template = Template {
    cells: &[&[1, 1, 1, 1]],
    color: Color::rgb(0, 240, 240),
};
static O_TEMPLATE: Template = Template {
    cells: &[&[1, 1], &[1, 1]],
    color: Color::rgb(240, 240, 0),
};
static T_TEMPLATE: Template = Template {
    cells: &[&[0, 1, 0], &[1, 1, 1]],
    color: Color::rgb(160, 0, 240),
};
static J_TEMPLATE: Template = Template {
    cells: &[&[1, 0, 0], &[1, 1, 1]],
    color: Color::rgb(0, 0, 240),
};
static L_TEMPLATE: Template = Template {
    cells: &[&[0, 0, 1], &[1, 1, 1]],
    color: Color::rgb(240, 160, 0),
};
static S_TEMPLATE: Template = Template {
    cells: &[&[0, 1, 1], &[1, 1, 0]],
    color: Color::rgb(0, 240, 0),
};
static Z_TEMPLATE: Template = Template {
    cells: &[&[1, 1, 0], &[0, 1, 1]],
    color: Color::rgb(240, 0, 0),
};

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::S,
        ShapeKind::Z,
    ];

    pub fn template(self) -> &'static Template {
        match self {
            ShapeKind::I => &I_TEMPLATE,
            ShapeKind::O => &O_TEMPLATE,
            ShapeKind::T => &T_TEMPLATE,
            ShapeKind::J => &J_TEMPLATE,
            ShapeKind::L => &L_TEMPLATE,
            ShapeKind::S => &S_TEMPLATE,
            ShapeKind::Z => &Z_TEMPLATE,
        }
    }

    pub fn color(self) -> Color {
        self.template().color
    }
}

// ============================================================================
// Piece
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// A falling (or queued) piece: an owned occupancy matrix anchored at its
/// top-left corner on the board.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: ShapeKind,
    pub matrix: Vec<Vec<bool>>,
    pub color: Color,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Spawns a piece centered horizontally on the top row.
    pub fn new(kind: ShapeKind) -> Self {
        let matrix = copy_matrix(kind.template());
        let width = matrix.first().map_or(0, Vec::len);
        let x = (COLS / 2) as i32 - (width / 2) as i32;
        Self::with_matrix(kind, matrix, x, 0)
    }

    pub fn new_at(kind: ShapeKind, x: i32, y: i32) -> Self {
        Self::with_matrix(kind, copy_matrix(kind.template()), x, y)
    }

    fn with_matrix(kind: ShapeKind, matrix: Vec<Vec<bool>>, x: i32, y: i32) -> Self {
        Self {
            kind,
            matrix,
            color: kind.color(),
            x,
            y,
        }
    }

    pub fn width(&self) -> usize {
        self.matrix.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.matrix.len()
    }

    /// Occupied cells as (row, col) offsets inside the matrix.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matrix.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(c, _)| (r, c))
        })
    }

    /// Absolute board positions of the occupied cells.
    pub fn blocks(&self) -> Vec<Position> {
        self.occupied()
            .map(|(r, c)| Position {
                x: self.x + c as i32,
                y: self.y + r as i32,
            })
            .collect()
    }

    /// The matrix turned 90° clockwise: transpose, then reverse each row.
    pub fn rotated_matrix(&self) -> Vec<Vec<bool>> {
        let height = self.height();
        (0..self.width())
            .map(|c| (0..height).rev().map(|r| self.matrix[r][c]).collect())
            .collect()
    }
}

fn copy_matrix(template: &Template) -> Vec<Vec<bool>> {
    template
        .cells
        .iter()
        .map(|row| row.iter().map(|&cell| cell != 0).collect())
        .collect()
}

// ============================================================================
// Piece Factory
// ============================================================================

pub trait PieceProvider {
    fn next_kind(&mut self) -> ShapeKind;
}

/// Uniform choice over the whole catalog.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_kind(&mut self) -> ShapeKind {
        ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())]
    }
}

/// Cycles through a fixed list; used for reproducible games and tests.
pub struct SequencePieceProvider {
    kinds: Vec<ShapeKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(kinds: Vec<ShapeKind>) -> Self {
        Self { kinds, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_kind(&mut self) -> ShapeKind {
        if self.kinds.is_empty() {
            return ShapeKind::O;
        }
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index += 1;
        kind
    }
}

pub fn create_piece(provider: &mut dyn PieceProvider) -> Piece {
    Piece::new(provider.next_kind())
}
