//! Zobrist keys, generated at compile time from a fixed seed.

use crate::castle_rights::CastleRights;
use crate::piece::Piece;
use crate::square::Square;

const SEED: u64 = 0x7669_6769_6c5f_7a6b;

const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), state)
}

struct Keys {
    piece_square: [[u64; 64]; 12],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static KEYS: Keys = {
    let mut state = SEED;
    let mut piece_square = [[0u64; 64]; 12];
    let mut p = 0;
    while p < 12 {
        let mut sq = 0;
        while sq < 64 {
            let (key, next) = splitmix64(state);
            piece_square[p][sq] = key;
            state = next;
            sq += 1;
        }
        p += 1;
    }

    let (black_to_move, next) = splitmix64(state);
    state = next;

    // The empty castling set hashes to zero so positions without rights
    // need no castling term at all.
    let mut castling = [0u64; 16];
    let mut i = 1;
    while i < 16 {
        let (key, next) = splitmix64(state);
        castling[i] = key;
        state = next;
        i += 1;
    }

    let mut en_passant_file = [0u64; 8];
    let mut f = 0;
    while f < 8 {
        let (key, next) = splitmix64(state);
        en_passant_file[f] = key;
        state = next;
        f += 1;
    }

    Keys { piece_square, black_to_move, castling, en_passant_file }
};

#[inline]
pub(crate) fn piece_square(piece: Piece, sq: Square) -> u64 {
    KEYS.piece_square[piece.index()][sq.index()]
}

#[inline]
pub(crate) fn black_to_move() -> u64 {
    KEYS.black_to_move
}

#[inline]
pub(crate) fn castling(rights: CastleRights) -> u64 {
    KEYS.castling[rights.bits() as usize]
}

#[inline]
pub(crate) fn en_passant_file(file: u8) -> u64 {
    KEYS.en_passant_file[file as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        let mut all: Vec<u64> = KEYS.piece_square.iter().flatten().copied().collect();
        all.push(KEYS.black_to_move);
        all.extend(&KEYS.castling[1..]);
        all.extend(&KEYS.en_passant_file);
        let n = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), n);
        assert!(all.iter().all(|&k| k != 0));
    }

    #[test]
    fn no_castling_rights_hash_to_zero() {
        assert_eq!(castling(CastleRights::NONE), 0);
        assert_ne!(castling(CastleRights::ALL), 0);
    }
}
