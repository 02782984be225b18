//! Attack sets for every piece type plus square-pair geometry.

mod magic;
mod tables;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::piece::PieceKind;
use crate::square::Square;

use self::magic::{bishop_lookup, rook_lookup};
use self::tables::{BETWEEN, KING_ATTACKS, KNIGHT_ATTACKS, LINE, PAWN_ATTACKS};

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

/// Squares a pawn of `color` standing on `sq` captures on.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index()]
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_lookup(sq.index(), occupied)
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_lookup(sq.index(), occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// Attacks of a non-pawn piece of `kind` on `sq`.
#[inline]
pub fn piece_attacks(kind: PieceKind, sq: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => Bitboard::EMPTY,
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::King => king_attacks(sq),
    }
}

/// Squares strictly between two aligned squares; empty if they are not aligned.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a.index()][b.index()]
}

/// The whole rank, file or diagonal through both squares, edge to edge.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    LINE[a.index()][b.index()]
}

#[cfg(test)]
mod tests {
    use super::magic::{slow_bishop_attacks, slow_rook_attacks};
    use super::*;

    #[test]
    fn leaper_counts() {
        assert_eq!(knight_attacks(Square::E4).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(king_attacks(Square::E1).count(), 5);
        assert_eq!(king_attacks(Square::H8).count(), 3);
    }

    #[test]
    fn pawn_captures_do_not_wrap() {
        let a = pawn_attacks(Color::White, Square::A4);
        assert_eq!(a, Square::B5.bitboard());
        let h = pawn_attacks(Color::Black, Square::H5);
        assert_eq!(h, Square::G4.bitboard());
        assert!(pawn_attacks(Color::White, Square::E8).is_empty());
    }

    #[test]
    fn rook_sees_fourteen_squares_on_empty_board() {
        for sq in Square::all() {
            assert_eq!(rook_attacks(sq, Bitboard::EMPTY).count(), 14, "{sq}");
        }
    }

    #[test]
    fn blockers_are_included_and_stop_the_ray() {
        let attacks = rook_attacks(Square::E4, Square::E6.bitboard());
        assert!(attacks.contains(Square::E6));
        assert!(!attacks.contains(Square::E7));
        let diag = bishop_attacks(Square::C1, Square::E3.bitboard());
        assert!(diag.contains(Square::E3));
        assert!(!diag.contains(Square::F4));
    }

    #[test]
    fn geometry() {
        assert_eq!(between(Square::E1, Square::E4), Square::E2.bitboard() | Square::E3.bitboard());
        assert_eq!(between(Square::A1, Square::H8).count(), 6);
        assert!(between(Square::A1, Square::B3).is_empty());
        assert!(between(Square::D4, Square::E5).is_empty());
        assert_eq!(line(Square::C3, Square::E5).count(), 8);
        assert!(line(Square::C3, Square::E5).contains(Square::A1));
        assert!(line(Square::A1, Square::B3).is_empty());
    }

    #[test]
    fn magic_lookup_agrees_with_ray_walk() {
        let mut rng: u64 = 0x0123_4567_89AB_CDEF;
        for sq in Square::all() {
            for _ in 0..64 {
                rng = rng
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let occ = rng & (rng >> 7);
                assert_eq!(
                    rook_attacks(sq, Bitboard::new(occ)).bits(),
                    slow_rook_attacks(sq.index(), occ),
                    "rook on {sq}"
                );
                assert_eq!(
                    bishop_attacks(sq, Bitboard::new(occ)).bits(),
                    slow_bishop_attacks(sq.index(), occ),
                    "bishop on {sq}"
                );
            }
        }
    }
}
