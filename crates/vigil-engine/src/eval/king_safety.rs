//! King safety: missing shield pawns plus a quadratic king-danger penalty.

use vigil_core::{Bitboard, Color, PieceKind, Position};

use super::mobility::Activity;
use super::params::EvalParams;
use super::score::{S, Score};

/// The two or three squares directly in front of the king.
fn shield(pos: &Position, color: Color) -> Bitboard {
    let front = pos.king_square(color).bitboard().forward(color);
    front | front.east() | front.west()
}

/// Danger the king of `color` is in, from the enemy's attack counts.
/// A single attacker is not considered dangerous.
pub fn king_danger(activity: &Activity, color: Color, params: &EvalParams) -> i32 {
    let enemy = (!color).index();
    if activity.attackers[enemy] < 2 {
        return 0;
    }
    let units = activity.attack_units[enemy];
    units * units / params.king_danger_divisor.max(1)
}

/// White-relative king safety. `danger` is indexed by the defending color.
pub fn king_safety(pos: &Position, danger: [i32; 2], params: &EvalParams) -> Score {
    let mut score = Score::ZERO;
    for color in Color::ALL {
        let mask = shield(pos, color);
        let missing = (mask & !pos.pieces_of(PieceKind::Pawn, color)).count() as i16;
        let danger = danger[color.index()].min(i16::MAX as i32) as i16;
        let side = params.missing_shield_pawn * missing - S(danger, danger / 4);
        match color {
            Color::White => score += side,
            Color::Black => score -= side,
        }
    }
    score
}
