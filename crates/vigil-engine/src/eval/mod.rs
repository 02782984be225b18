//! Static evaluation behind the [`Evaluator`] trait.

pub mod king_safety;
pub mod material;
pub mod mobility;
pub mod params;
pub mod pawns;
pub mod phase;
pub mod score;

use vigil_core::{Color, Position};

pub use params::EvalParams;
pub use pawns::PawnCache;
pub use phase::MAX_PHASE;
pub use score::{S, Score};

/// Largest magnitude an evaluator may return; keeps static scores clear of
/// tablebase and mate scores.
pub const EVAL_LIMIT: i32 = 20_000;

/// Output of one static evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Side-to-move relative, in centipawns.
    pub score: i32,
    /// `0..=MAX_PHASE`.
    pub phase: i32,
    /// Safe squares reached, indexed by color.
    pub mobility: [i32; 2],
    /// Danger each color's king is in.
    pub king_danger: [i32; 2],
}

/// A static evaluation function shared by every search thread.
///
/// The pawn cache is the caller's, one per thread.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, pos: &Position, pawns: &mut PawnCache) -> Evaluation;
}

/// Tapered hand-crafted evaluation over an [`EvalParams`] bundle.
#[derive(Clone, Debug, Default)]
pub struct ClassicalEvaluator {
    params: EvalParams,
}

impl ClassicalEvaluator {
    pub fn new(params: EvalParams) -> ClassicalEvaluator {
        ClassicalEvaluator { params }
    }

    pub fn params(&self) -> &EvalParams {
        &self.params
    }
}

impl Evaluator for ClassicalEvaluator {
    fn evaluate(&self, pos: &Position, pawns: &mut PawnCache) -> Evaluation {
        let params = &self.params;
        let phase = phase::game_phase(pos);

        let structure = match pawns.probe(pos.pawn_hash()) {
            Some(score) => score,
            None => {
                let score = pawns::evaluate_pawns(pos, params);
                pawns.store(pos.pawn_hash(), score);
                score
            }
        };

        let activity = mobility::activity(pos, params);
        let danger = [
            king_safety::king_danger(&activity, Color::White, params),
            king_safety::king_danger(&activity, Color::Black, params),
        ];

        let total = material::material_and_placement(pos, params)
            + structure
            + activity.mobility[Color::White.index()]
            - activity.mobility[Color::Black.index()]
            + king_safety::king_safety(pos, danger, params);

        let white = total.taper(phase, MAX_PHASE);
        let score = white * pos.side_to_move().sign() + params.tempo;

        Evaluation {
            score: score.clamp(-EVAL_LIMIT, EVAL_LIMIT),
            phase,
            mobility: activity.squares,
            king_danger: danger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> Evaluation {
        let pos: Position = fen.parse().unwrap();
        ClassicalEvaluator::default().evaluate(&pos, &mut PawnCache::new(64))
    }

    #[test]
    fn start_position_is_tempo_only() {
        let e = eval(vigil_core::STARTING_FEN);
        assert_eq!(e.score, EvalParams::default().tempo);
        assert_eq!(e.phase, MAX_PHASE);
        assert_eq!(e.mobility[0], e.mobility[1]);
    }

    #[test]
    fn score_is_side_to_move_relative() {
        let white = eval("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").score;
        let black = eval("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").score;
        let tempo = EvalParams::default().tempo;
        assert!(white > 800);
        assert_eq!(white - tempo, -(black - tempo));
    }

    #[test]
    fn colour_flipped_positions_score_the_same() {
        let a = eval("r3k2r/pp3ppp/2n5/3p4/3P4/2N5/PP3PPP/R3K2R w KQkq - 0 1").score;
        let b = eval("r3k2r/pp3ppp/2n5/3p4/3P4/2N5/PP3PPP/R3K2R b KQkq - 0 1").score;
        assert_eq!(a, b);
    }

    #[test]
    fn pawn_cache_is_filled_and_reused() {
        let pos = Position::startpos();
        let evaluator = ClassicalEvaluator::default();
        let mut cache = PawnCache::new(64);
        let first = evaluator.evaluate(&pos, &mut cache);
        assert!(cache.probe(pos.pawn_hash()).is_some());
        assert_eq!(evaluator.evaluate(&pos, &mut cache), first);
    }

    #[test]
    fn evaluator_is_a_trait_object() {
        let boxed: Box<dyn Evaluator> = Box::new(ClassicalEvaluator::new(EvalParams::default()));
        let mut cache = PawnCache::default();
        assert_eq!(boxed.evaluate(&Position::startpos(), &mut cache).phase, MAX_PHASE);
    }
}
