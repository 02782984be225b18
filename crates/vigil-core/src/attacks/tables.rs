//! Leaper attack tables and square-pair geometry, all built at compile time.

use crate::bitboard::Bitboard;

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

#[inline]
const fn on_board(rank: i8, file: i8) -> bool {
    rank >= 0 && rank < 8 && file >= 0 && file < 8
}

#[inline]
const fn bit(rank: i8, file: i8) -> u64 {
    1u64 << (rank as u32 * 8 + file as u32)
}

/// Squares reached from every origin by a fixed set of (rank, file) jumps.
const fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut d = 0;
        while d < deltas.len() {
            let (r, f) = (rank + deltas[d].0, file + deltas[d].1);
            if on_board(r, f) {
                bits |= bit(r, f);
            }
            d += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

const fn pawn_table() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut side = 0;
        while side < 2 {
            let r = if side == 0 { rank + 1 } else { rank - 1 };
            let mut bits = 0u64;
            if on_board(r, file - 1) {
                bits |= bit(r, file - 1);
            }
            if on_board(r, file + 1) {
                bits |= bit(r, file + 1);
            }
            table[side][sq] = Bitboard::new(bits);
            side += 1;
        }
        sq += 1;
    }
    table
}

/// Unit step from `a` to `b`, or `None` when the squares share no line.
const fn direction(a: usize, b: usize) -> Option<(i8, i8)> {
    if a == b {
        return None;
    }
    let dr = (b / 8) as i8 - (a / 8) as i8;
    let df = (b % 8) as i8 - (a % 8) as i8;
    if dr != 0 && df != 0 && dr.abs() != df.abs() {
        return None;
    }
    Some((dr.signum(), df.signum()))
}

/// Walk from `(rank, file)` in steps of `(dr, df)` until `stop` or the edge,
/// excluding the start and `stop` itself.
const fn walk(rank: i8, file: i8, dr: i8, df: i8, stop: Option<usize>) -> u64 {
    let mut bits = 0u64;
    let (mut r, mut f) = (rank + dr, file + df);
    while on_board(r, f) {
        if let Some(s) = stop
            && (r as usize) * 8 + f as usize == s
        {
            break;
        }
        bits |= bit(r, f);
        r += dr;
        f += df;
    }
    bits
}

const fn geometry(full_line: bool) -> [[Bitboard; 64]; 64] {
    let mut table = [[Bitboard::EMPTY; 64]; 64];
    let mut a = 0;
    while a < 64 {
        let mut b = 0;
        while b < 64 {
            if let Some((dr, df)) = direction(a, b) {
                let (r, f) = ((a / 8) as i8, (a % 8) as i8);
                let bits = if full_line {
                    walk(r, f, dr, df, None) | walk(r, f, -dr, -df, None) | bit(r, f)
                } else {
                    walk(r, f, dr, df, Some(b))
                };
                table[a][b] = Bitboard::new(bits);
            }
            b += 1;
        }
        a += 1;
    }
    table
}

pub(crate) static KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_DELTAS);
pub(crate) static KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_DELTAS);
pub(crate) static PAWN_ATTACKS: [[Bitboard; 64]; 2] = pawn_table();
pub(crate) static BETWEEN: [[Bitboard; 64]; 64] = geometry(false);
pub(crate) static LINE: [[Bitboard; 64]; 64] = geometry(true);
