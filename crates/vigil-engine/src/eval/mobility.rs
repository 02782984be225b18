//! Piece mobility and king-zone attack counting, gathered in one pass.

use vigil_core::{Bitboard, Color, PieceKind, Position, king_attacks, piece_attacks};

use super::params::EvalParams;
use super::score::Score;

const MOBILE: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

/// Per-color activity figures; index by [`Color::index`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Activity {
    pub mobility: [Score; 2],
    /// Safe squares reached, summed over all mobile pieces.
    pub squares: [i32; 2],
    /// Weighted attacks this color lands on the enemy king zone.
    pub attack_units: [i32; 2],
    /// Number of pieces taking part in those attacks.
    pub attackers: [i32; 2],
}

/// All squares attacked by `color`'s pawns.
pub fn pawn_attack_span(pawns: Bitboard, color: Color) -> Bitboard {
    let ahead = pawns.forward(color);
    ahead.east() | ahead.west()
}

/// Safe squares exclude our own pieces and squares covered by enemy pawns.
pub fn activity(pos: &Position, params: &EvalParams) -> Activity {
    let mut out = Activity::default();
    let occupied = pos.occupied();

    for color in Color::ALL {
        let us = color.index();
        let enemy_pawns = pos.pieces_of(PieceKind::Pawn, !color);
        let safe = !pos.side(color) & !pawn_attack_span(enemy_pawns, !color);
        let enemy_king = pos.king_square(!color);
        let zone = king_attacks(enemy_king) | enemy_king.bitboard();

        for (slot, kind) in MOBILE.into_iter().enumerate() {
            for from in pos.pieces_of(kind, color) {
                let attacks = piece_attacks(kind, from, occupied);
                let reach = (attacks & safe).count() as i32;
                out.squares[us] += reach;
                out.mobility[us] += params.mobility[slot] * reach as i16;

                let hits = (attacks & zone).count() as i32;
                if hits > 0 {
                    out.attackers[us] += 1;
                    out.attack_units[us] += params.king_attack_weight[slot] * hits;
                }
            }
        }
    }

    out
}
