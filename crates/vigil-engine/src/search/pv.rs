//! Triangular principal-variation table.

use vigil_core::Move;

use super::MAX_PLY;

const ROWS: usize = MAX_PLY + 2;

/// Row `ply` holds the best line found from `ply` onward; a new best move
/// is prepended to the child's row.
pub struct PvTable {
    moves: Box<[[Move; ROWS]; ROWS]>,
    len: [usize; ROWS],
}

impl PvTable {
    pub fn new() -> PvTable {
        PvTable {
            moves: Box::new([[Move::NULL; ROWS]; ROWS]),
            len: [0; ROWS],
        }
    }

    pub fn clear(&mut self, ply: usize) {
        if ply < ROWS {
            self.len[ply] = 0;
        }
    }

    /// `mv` followed by the line at `ply + 1`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply + 1 >= ROWS {
            return;
        }
        let (top, bottom) = self.moves.split_at_mut(ply + 1);
        let copy = self.len[ply + 1].min(ROWS - 1);
        top[ply][0] = mv;
        top[ply][1..=copy].copy_from_slice(&bottom[0][..copy]);
        self.len[ply] = copy + 1;
    }

    pub fn line(&self, ply: usize) -> &[Move] {
        match self.moves.get(ply) {
            Some(row) => &row[..self.len[ply]],
            None => &[],
        }
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}
