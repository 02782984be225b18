//! Pawn structure terms and the per-thread cache keyed by the pawn hash.

use vigil_core::{Bitboard, Color, PieceKind, Position, Square, pawn_attacks};

use super::params::EvalParams;
use super::score::Score;

static ADJACENT_FILES: [Bitboard; 8] = adjacent_files();

/// `[color][square]`: same and adjacent files strictly ahead of the square.
static PASSED_SPAN: [[Bitboard; 64]; 2] = passed_spans();

const fn adjacent_files() -> [Bitboard; 8] {
    let mut table = [Bitboard::EMPTY; 8];
    let mut f = 0u8;
    while f < 8 {
        let mut bits = 0;
        if f > 0 {
            bits |= Bitboard::file(f - 1).bits();
        }
        if f < 7 {
            bits |= Bitboard::file(f + 1).bits();
        }
        table[f as usize] = Bitboard::new(bits);
        f += 1;
    }
    table
}

const fn passed_spans() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as u8;
        let rank = (sq / 8) as u8;
        let span = Bitboard::file(file).bits() | ADJACENT_FILES[file as usize].bits();
        let mut ahead_white = 0u64;
        let mut ahead_black = 0u64;
        let mut r = 0u8;
        while r < 8 {
            if r > rank {
                ahead_white |= Bitboard::rank(r).bits();
            }
            if r < rank {
                ahead_black |= Bitboard::rank(r).bits();
            }
            r += 1;
        }
        table[0][sq] = Bitboard::new(span & ahead_white);
        table[1][sq] = Bitboard::new(span & ahead_black);
        sq += 1;
    }
    table
}

/// Adjacent-file squares level with or behind `sq`, from `color`'s side.
fn support_span(sq: Square, color: Color) -> Bitboard {
    let behind = PASSED_SPAN[(!color).index()][sq.index()] | Bitboard::rank(sq.rank());
    behind & ADJACENT_FILES[sq.file() as usize]
}

pub fn is_passed(sq: Square, color: Color, enemy_pawns: Bitboard) -> bool {
    (PASSED_SPAN[color.index()][sq.index()] & enemy_pawns).is_empty()
}

/// Pawn structure for both sides, White-relative. Depends on pawns only, so
/// the result can be cached under the pawn hash.
pub fn evaluate_pawns(pos: &Position, params: &EvalParams) -> Score {
    let white = pos.pieces_of(PieceKind::Pawn, Color::White);
    let black = pos.pieces_of(PieceKind::Pawn, Color::Black);
    side_structure(white, black, Color::White, params)
        - side_structure(black, white, Color::Black, params)
}

fn side_structure(ours: Bitboard, theirs: Bitboard, color: Color, params: &EvalParams) -> Score {
    let mut score = Score::ZERO;

    for file in 0..8 {
        let stacked = (Bitboard::file(file) & ours).count();
        if stacked > 1 {
            score += params.doubled_pawn * (stacked - 1) as i16;
        }
    }

    for sq in ours {
        let supporters = pawn_attacks(!color, sq) & ours;

        if is_passed(sq, color, theirs) {
            score += params.passed_pawn[sq.relative_rank(color) as usize];
            if supporters.any() {
                score += params.passed_supported;
            }
        }

        if (ADJACENT_FILES[sq.file() as usize] & ours).is_empty() {
            score += params.isolated_pawn;
            continue;
        }

        if (support_span(sq, color) & ours).is_empty() {
            let stop = sq.bitboard().forward(color);
            if let Some(stop) = stop.lsb()
                && (pawn_attacks(color, stop) & theirs).any()
            {
                score += params.backward_pawn;
            }
        }

        if supporters.any() {
            score += params.connected_pawn;
        }
    }

    score
}

#[derive(Clone, Copy, Default)]
struct PawnEntry {
    key: u64,
    score: Score,
    filled: bool,
}

/// Direct-mapped cache of pawn structure scores. One per search thread.
pub struct PawnCache {
    entries: Box<[PawnEntry]>,
    mask: usize,
}

impl PawnCache {
    pub const DEFAULT_ENTRIES: usize = 1 << 14;

    /// `entries` is rounded up to a power of two.
    pub fn new(entries: usize) -> PawnCache {
        let len = entries.max(1).next_power_of_two();
        PawnCache {
            entries: vec![PawnEntry::default(); len].into_boxed_slice(),
            mask: len - 1,
        }
    }

    pub fn probe(&self, key: u64) -> Option<Score> {
        let entry = &self.entries[key as usize & self.mask];
        (entry.filled && entry.key == key).then_some(entry.score)
    }

    pub fn store(&mut self, key: u64, score: Score) {
        self.entries[key as usize & self.mask] = PawnEntry { key, score, filled: true };
    }

    pub fn clear(&mut self) {
        self.entries.fill(PawnEntry::default());
    }
}

impl Default for PawnCache {
    fn default() -> Self {
        PawnCache::new(Self::DEFAULT_ENTRIES)
    }
}
