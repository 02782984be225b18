//! Game phase from remaining non-pawn material.

use vigil_core::{PieceKind, Position};

/// Knights and bishops weigh 1, rooks 2, queens 4: a full set sums to 24.
pub const MAX_PHASE: i32 = 24;

const WEIGHTS: [(PieceKind, i32); 4] = [
    (PieceKind::Knight, 1),
    (PieceKind::Bishop, 1),
    (PieceKind::Rook, 2),
    (PieceKind::Queen, 4),
];

/// `MAX_PHASE` for a full middlegame set, 0 for a pawn ending. Promotions
/// cannot push the result past the maximum.
pub fn game_phase(pos: &Position) -> i32 {
    WEIGHTS
        .iter()
        .map(|&(kind, weight)| pos.pieces(kind).count() as i32 * weight)
        .sum::<i32>()
        .min(MAX_PHASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_full_phase() {
        assert_eq!(game_phase(&Position::startpos()), MAX_PHASE);
    }

    #[test]
    fn pawn_ending_is_zero() {
        let pos: Position = "8/4p3/4k3/8/8/4K3/4P3/8 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&pos), 0);
    }

    #[test]
    fn losing_a_queen_costs_four() {
        let pos: Position = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        assert_eq!(game_phase(&pos), 20);
    }

    #[test]
    fn promoted_queens_are_clamped() {
        let pos: Position = "QQQQkQQQ/8/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&pos), MAX_PHASE);
    }
}
