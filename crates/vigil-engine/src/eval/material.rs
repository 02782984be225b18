//! Material, piece-square and bishop-pair terms, White-relative.

use vigil_core::{Color, PieceKind, Position};

use super::params::EvalParams;
use super::score::Score;

pub fn material_and_placement(pos: &Position, params: &EvalParams) -> Score {
    let mut score = Score::ZERO;
    for color in Color::ALL {
        let mut side = Score::ZERO;
        for kind in PieceKind::ALL {
            for sq in pos.pieces_of(kind, color) {
                side += params.material(kind) + params.psqt(kind, color, sq);
            }
        }
        if pos.pieces_of(PieceKind::Bishop, color).more_than_one() {
            side += params.bishop_pair;
        }
        match color {
            Color::White => score += side,
            Color::Black => score -= side,
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_balanced() {
        let params = EvalParams::default();
        assert_eq!(material_and_placement(&Position::startpos(), &params), Score::ZERO);
    }

    #[test]
    fn missing_queen_shows_up_with_its_square() {
        let params = EvalParams::default();
        let pos: Position = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        let d8 = vigil_core::Square::D8;
        let expected = params.material(PieceKind::Queen)
            + params.psqt(PieceKind::Queen, Color::Black, d8);
        assert_eq!(material_and_placement(&pos, &params), expected);
    }

    #[test]
    fn lone_bishop_pair_is_rewarded() {
        let params = EvalParams::default();
        let with_pair: Position = "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1".parse().unwrap();
        let bishops = params.material(PieceKind::Bishop) * 2
            + params.psqt(PieceKind::Bishop, Color::White, vigil_core::Square::C1)
            + params.psqt(PieceKind::Bishop, Color::White, vigil_core::Square::F1);
        let kings = params.psqt(PieceKind::King, Color::White, vigil_core::Square::E1)
            - params.psqt(PieceKind::King, Color::Black, vigil_core::Square::E8);
        assert_eq!(
            material_and_placement(&with_pair, &params),
            bishops + kings + params.bishop_pair
        );
    }
}
