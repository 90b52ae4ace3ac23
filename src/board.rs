//! The settled-cell grid: collision queries, merging and line clearing.

use crate::config::{COLS, ROWS};
use crate::shapes::{Color, Piece};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Filled(Color),
}

impl CellState {
    pub fn is_filled(&self) -> bool {
        matches!(self, CellState::Filled(_))
    }
}

/// `ROWS` x `COLS` grid, row 0 at the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    rows: Vec<Vec<CellState>>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: vec![Self::empty_row(); ROWS],
        }
    }

    fn empty_row() -> Vec<CellState> {
        vec![CellState::Empty; COLS]
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<CellState> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Sets a single cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: usize, y: usize, cell: CellState) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(CellState::Empty);
        }
    }

    /// Would `piece`, shifted by (`dx`, `dy`), leave the board or overlap a settled cell?
    ///
    /// Cells above row 0 are not out of bounds; only the sides and the floor are.
    pub fn collides(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        for (r, c) in piece.occupied() {
            let x = piece.x + c as i32 + dx;
            let y = piece.y + r as i32 + dy;

            if x < 0 || x >= COLS as i32 || y >= ROWS as i32 {
                return true;
            }
            if y >= 0 && self.rows[y as usize][x as usize].is_filled() {
                return true;
            }
        }
        false
    }

    /// Writes the piece's color into the board. Cells outside the grid are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        for block in piece.blocks() {
            if block.x >= 0 && block.y >= 0 {
                self.set(block.x as usize, block.y as usize, CellState::Filled(piece.color));
            }
        }
    }

    /// Removes every full row, bottom to top, and returns how many went.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = ROWS;

        while y > 0 {
            let row = y - 1;
            if self.is_row_complete(row) {
                self.rows.remove(row);
                self.rows.insert(0, Self::empty_row());
                cleared += 1;
                // the row above has shifted into `row`; look at it again
            } else {
                y -= 1;
            }
        }

        cleared
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.rows[y].iter().all(CellState::is_filled)
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows[y].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub const MARKER: Color = Color::rgb(128, 128, 128);

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..COLS {
            board.set(x, y, CellState::Filled(MARKER));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        for x in 0..COLS {
            if x != gap_x {
                board.set(x, y, CellState::Filled(MARKER));
            }
        }
    }
}
