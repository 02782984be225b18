//! Leaf-node counting over the generator and `apply`, for regression testing.

use crate::movegen::{MoveList, generate, phase};
use crate::moves::Move;
use crate::position::Position;

fn moves_for(pos: &Position) -> MoveList {
    if pos.in_check() {
        generate::<phase::Evasions>(pos)
    } else {
        generate::<phase::All>(pos)
    }
}

/// Number of legal move sequences of length `depth` from `pos`.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = moves_for(pos);
    let children = moves.iter().filter_map(|mv| pos.apply(mv));
    if depth == 1 {
        return children.count() as u64;
    }
    children.map(|child| perft(&child, depth - 1)).sum()
}

/// Per-root-move node counts, sorted by coordinate notation.
pub fn divide(pos: &Position, depth: u32) -> Vec<(Move, u64)> {
    let mut counts: Vec<(Move, u64)> = moves_for(pos)
        .iter()
        .filter_map(|mv| {
            let child = pos.apply(mv)?;
            Some((mv, perft(&child, depth.saturating_sub(1))))
        })
        .collect();
    counts.sort_by_key(|(mv, _)| mv.to_uci());
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn run(fen: &str, expected: &[u64]) {
        let pos: Position = fen.parse().unwrap();
        for (depth, &nodes) in expected.iter().enumerate() {
            assert_eq!(perft(&pos, depth as u32 + 1), nodes, "{fen} depth {}", depth + 1);
        }
    }

    #[test]
    fn depth_zero_is_one() {
        assert_eq!(perft(&Position::startpos(), 0), 1);
    }

    #[test]
    fn startpos_shallow() {
        run(crate::fen::STARTING_FEN, &[20, 400, 8_902, 197_281]);
    }

    #[test]
    #[ignore] // slow in debug builds
    fn startpos_depth_5() {
        assert_eq!(perft(&Position::startpos(), 5), 4_865_609);
    }

    #[test]
    fn kiwipete() {
        run(KIWIPETE, &[48, 2_039, 97_862]);
    }

    #[test]
    #[ignore]
    fn kiwipete_depth_4() {
        assert_eq!(perft(&KIWIPETE.parse().unwrap(), 4), 4_085_603);
    }

    #[test]
    fn position_3() {
        run(POSITION_3, &[14, 191, 2_812, 43_238]);
    }

    #[test]
    fn position_4() {
        run(POSITION_4, &[6, 264, 9_467]);
    }

    #[test]
    fn position_5() {
        run(POSITION_5, &[44, 1_486, 62_379]);
    }

    #[test]
    fn divide_sums_to_perft() {
        let pos: Position = KIWIPETE.parse().unwrap();
        let split = divide(&pos, 2);
        assert_eq!(split.len(), 48);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 2_039);
        assert!(split.windows(2).all(|w| w[0].0.to_uci() <= w[1].0.to_uci()));
    }
}
