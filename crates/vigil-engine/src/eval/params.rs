//! Tunable evaluation weights.
//!
//! An [`EvalParams`] bundle is cloned into each evaluator; a tuner works on
//! its own clones and never touches a live evaluator.

use vigil_core::{Color, PieceKind, Square};

use super::score::{S, Score};

/// Every weight the classical evaluator reads.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalParams {
    /// Indexed by [`PieceKind::index`]; the king entry is ignored.
    pub material: [Score; PieceKind::COUNT],
    /// White's view, a1 = 0. Black squares are mirrored by rank.
    pub psqt: [[Score; 64]; PieceKind::COUNT],
    pub bishop_pair: Score,
    /// Indexed by the pawn's relative rank.
    pub passed_pawn: [Score; 8],
    pub passed_supported: Score,
    pub isolated_pawn: Score,
    pub doubled_pawn: Score,
    pub backward_pawn: Score,
    pub connected_pawn: Score,
    /// Per safe square, knight through queen.
    pub mobility: [Score; 4],
    /// Weight of one attack on the enemy king zone, knight through queen.
    pub king_attack_weight: [i32; 4],
    /// King danger is squared and divided by this before it is applied.
    pub king_danger_divisor: i32,
    pub missing_shield_pawn: Score,
    pub tempo: i32,
}

impl EvalParams {
    #[inline]
    pub fn psqt(&self, kind: PieceKind, color: Color, sq: Square) -> Score {
        self.psqt[kind.index()][sq.relative_to(color).index()]
    }

    #[inline]
    pub fn material(&self, kind: PieceKind) -> Score {
        self.material[kind.index()]
    }
}

impl Default for EvalParams {
    fn default() -> Self {
        EvalParams {
            material: [
                S(90, 120),
                S(330, 300),
                S(345, 320),
                S(480, 540),
                S(980, 1000),
                S(0, 0),
            ],
            psqt: [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING],
            bishop_pair: S(35, 55),
            passed_pawn: [
                S(0, 0),
                S(0, 8),
                S(4, 14),
                S(12, 30),
                S(30, 55),
                S(55, 100),
                S(90, 160),
                S(0, 0),
            ],
            passed_supported: S(10, 20),
            isolated_pawn: S(-12, -16),
            doubled_pawn: S(-8, -22),
            backward_pawn: S(-10, -8),
            connected_pawn: S(6, 6),
            mobility: [S(5, 4), S(5, 5), S(3, 5), S(2, 4)],
            king_attack_weight: [18, 14, 22, 40],
            king_danger_divisor: 64,
            missing_shield_pawn: S(-22, 0),
            tempo: 12,
        }
    }
}

#[rustfmt::skip]
const PAWN: [Score; 64] = [
    S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),
    S(-4, 4),  S(6, 2),   S(2, 2),   S(-14, 6), S(-14, 6), S(8, 2),   S(12, 0),  S(-2, 2),
    S(-6, 0),  S(-2, 0),  S(4, -2),  S(6, -2),  S(6, -2),  S(0, -2),  S(2, 0),   S(-6, 0),
    S(-4, 8),  S(0, 6),   S(8, 0),   S(18, -4), S(18, -4), S(6, 0),   S(0, 6),   S(-4, 8),
    S(2, 18),  S(6, 14),  S(10, 8),  S(22, 2),  S(22, 2),  S(10, 8),  S(6, 14),  S(2, 18),
    S(12, 40), S(16, 36), S(24, 28), S(30, 22), S(30, 22), S(24, 28), S(16, 36), S(12, 40),
    S(40, 80), S(44, 76), S(48, 70), S(52, 64), S(52, 64), S(48, 70), S(44, 76), S(40, 80),
    S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),   S(0, 0),
];

#[rustfmt::skip]
const KNIGHT: [Score; 64] = [
    S(-60, -40), S(-22, -30), S(-30, -18), S(-18, -10), S(-18, -10), S(-30, -18), S(-22, -30), S(-60, -40),
    S(-30, -24), S(-20, -10), S(-2, -4),   S(4, 2),     S(4, 2),     S(-2, -4),   S(-20, -10), S(-30, -24),
    S(-22, -16), S(2, -2),    S(10, 4),    S(14, 12),   S(14, 12),   S(10, 4),    S(2, -2),    S(-22, -16),
    S(-14, -8),  S(6, 4),     S(18, 14),   S(20, 20),   S(20, 20),   S(18, 14),   S(6, 4),     S(-14, -8),
    S(-10, -8),  S(10, 6),    S(22, 16),   S(28, 22),   S(28, 22),   S(22, 16),   S(10, 6),    S(-10, -8),
    S(-16, -14), S(8, -2),    S(26, 6),    S(30, 10),   S(30, 10),   S(26, 6),    S(8, -2),    S(-16, -14),
    S(-26, -22), S(-14, -12), S(6, -6),    S(12, 0),    S(12, 0),    S(6, -6),    S(-14, -12), S(-26, -22),
    S(-80, -50), S(-36, -34), S(-24, -24), S(-16, -18), S(-16, -18), S(-24, -24), S(-36, -34), S(-80, -50),
];

#[rustfmt::skip]
const BISHOP: [Score; 64] = [
    S(-16, -14), S(-4, -8),  S(-10, -8), S(-8, -4), S(-8, -4), S(-10, -8), S(-4, -8),  S(-16, -14),
    S(-2, -8),   S(10, -4),  S(6, -2),   S(2, 2),   S(2, 2),   S(6, -2),   S(10, -4),  S(-2, -8),
    S(-4, -4),   S(8, 0),    S(10, 4),   S(8, 6),   S(8, 6),   S(10, 4),   S(8, 0),    S(-4, -4),
    S(-2, -2),   S(4, 2),    S(8, 6),    S(16, 8),  S(16, 8),  S(8, 6),    S(4, 2),    S(-2, -2),
    S(-4, -2),   S(6, 2),    S(10, 6),   S(18, 8),  S(18, 8),  S(10, 6),   S(6, 2),    S(-4, -2),
    S(-8, -4),   S(4, 0),    S(8, 2),    S(10, 4),  S(10, 4),  S(8, 2),    S(4, 0),    S(-8, -4),
    S(-14, -8),  S(-6, -4),  S(-2, -2),  S(-2, 0),  S(-2, 0),  S(-2, -2),  S(-6, -4),  S(-14, -8),
    S(-22, -14), S(-12, -10), S(-14, -10), S(-12, -6), S(-12, -6), S(-14, -10), S(-12, -10), S(-22, -14),
];

#[rustfmt::skip]
const ROOK: [Score; 64] = [
    S(-4, -2), S(-2, -2), S(2, -2),  S(8, -4),  S(8, -4),  S(4, -2),  S(-2, -2), S(-6, -2),
    S(-16, -4), S(-8, -4), S(-6, -2), S(-2, -2), S(-2, -2), S(-6, -2), S(-8, -4), S(-16, -4),
    S(-14, 0), S(-6, 0),  S(-4, 0),  S(-2, 0),  S(-2, 0),  S(-4, 0),  S(-6, 0),  S(-14, 0),
    S(-10, 2), S(-4, 2),  S(-2, 2),  S(0, 2),   S(0, 2),   S(-2, 2),  S(-4, 2),  S(-10, 2),
    S(-6, 4),  S(0, 4),   S(2, 4),   S(4, 4),   S(4, 4),   S(2, 4),   S(0, 4),   S(-6, 4),
    S(-2, 4),  S(4, 4),   S(6, 4),   S(8, 2),   S(8, 2),   S(6, 4),   S(4, 4),   S(-2, 4),
    S(12, 8),  S(18, 10), S(20, 10), S(22, 8),  S(22, 8),  S(20, 10), S(18, 10), S(12, 8),
    S(6, 6),   S(6, 6),   S(8, 6),   S(10, 4),  S(10, 4),  S(8, 6),   S(6, 6),   S(6, 6),
];

#[rustfmt::skip]
const QUEEN: [Score; 64] = [
    S(-12, -20), S(-8, -16), S(-4, -12), S(2, -10), S(2, -10), S(-4, -12), S(-8, -16), S(-12, -20),
    S(-8, -14),  S(0, -8),   S(4, -6),   S(4, -2),  S(4, -2),  S(4, -6),   S(0, -8),   S(-8, -14),
    S(-6, -8),   S(2, -4),   S(4, 2),    S(2, 4),   S(2, 4),   S(4, 2),    S(2, -4),   S(-6, -8),
    S(-4, -4),   S(0, 2),    S(2, 8),    S(2, 12),  S(2, 12),  S(2, 8),    S(0, 2),    S(-4, -4),
    S(-6, -2),   S(-2, 4),   S(0, 10),   S(0, 14),  S(0, 14),  S(0, 10),   S(-2, 4),   S(-6, -2),
    S(-8, -6),   S(-4, 0),   S(0, 6),    S(2, 8),   S(2, 8),   S(0, 6),    S(-4, 0),   S(-8, -6),
    S(-12, -10), S(-10, -6), S(-4, -2),  S(-2, 0),  S(-2, 0),  S(-4, -2),  S(-10, -6), S(-12, -10),
    S(-16, -18), S(-12, -14), S(-8, -10), S(-6, -8), S(-6, -8), S(-8, -10), S(-12, -14), S(-16, -18),
];

#[rustfmt::skip]
const KING: [Score; 64] = [
    S(20, -50),  S(34, -30),  S(10, -22),  S(-12, -20), S(-2, -22),  S(-14, -20), S(32, -30),  S(22, -50),
    S(16, -28),  S(12, -14),  S(-10, -6),  S(-30, -2),  S(-30, -2),  S(-10, -6),  S(12, -14),  S(16, -28),
    S(-14, -18), S(-18, -4),  S(-26, 6),   S(-38, 12),  S(-38, 12),  S(-26, 6),   S(-18, -4),  S(-14, -18),
    S(-28, -12), S(-34, 4),   S(-44, 16),  S(-54, 22),  S(-54, 22),  S(-44, 16),  S(-34, 4),   S(-28, -12),
    S(-36, -8),  S(-42, 10),  S(-52, 20),  S(-62, 26),  S(-62, 26),  S(-52, 20),  S(-42, 10),  S(-36, -8),
    S(-44, -8),  S(-50, 10),  S(-58, 20),  S(-66, 24),  S(-66, 24),  S(-58, 20),  S(-50, 10),  S(-44, -8),
    S(-52, -16), S(-56, 0),   S(-62, 8),   S(-70, 12),  S(-70, 12),  S(-62, 8),   S(-56, 0),   S(-52, -16),
    S(-60, -40), S(-62, -20), S(-66, -14), S(-72, -10), S(-72, -10), S(-66, -14), S(-62, -20), S(-60, -40),
];
