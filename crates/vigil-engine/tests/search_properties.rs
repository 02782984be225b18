//! Whole-search properties: determinism, mate distances, zugzwang and
//! terminal positions.

use vigil_core::Position;
use vigil_engine::search::{DRAW, MATE, mate_in, mated_in};
use vigil_engine::{EngineConfig, SearchConfig, SearchLimits, SearchResult, ThreadPool};

/// Kc6 and Rh1 against Ka8: mate in two, none in one.
const ROOK_MATE_IN_TWO: &str = "k7/8/2K5/8/8/8/8/7R w - - 0 1";
/// Trébuchet: whoever moves loses their pawn.
const TREBUCHET_WHITE: &str = "8/8/8/2Kp4/3Pk3/8/8/8 w - - 0 1";
const TREBUCHET_BLACK: &str = "8/8/8/2Kp4/3Pk3/8/8/8 b - - 0 1";
const STALEMATE: &str = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1";
const CHECKMATE: &str = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1";

fn search(fen: &str, depth: u8, search: SearchConfig) -> SearchResult {
    let pos: Position = fen.parse().unwrap();
    let config = EngineConfig {
        search,
        ..EngineConfig::default()
    };
    let mut pool = ThreadPool::new(config).unwrap();
    pool.search(&pos, &SearchLimits::depth(depth), &[], |_, _, _, _| {})
}

fn play(fen: &str, line: &[vigil_core::Move]) -> Position {
    let mut pos: Position = fen.parse().unwrap();
    for &mv in line {
        pos = pos.apply(mv).unwrap();
    }
    pos
}

#[test]
fn searches_without_tt_are_repeatable() {
    let config = SearchConfig {
        use_tt: false,
        ..SearchConfig::default()
    };
    let ruy_lopez = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";
    for fen in [vigil_core::STARTING_FEN, ruy_lopez] {
        let first = search(fen, 5, config.clone());
        let second = search(fen, 5, config.clone());
        assert_eq!(first.best_move, second.best_move, "{fen}");
        assert_eq!(first.score, second.score, "{fen}");
        assert_eq!(first.pv, second.pv, "{fen}");
        assert_eq!(first.nodes, second.nodes, "{fen}");
    }
}

#[test]
fn mate_distance_shrinks_along_the_pv() {
    let result = search(ROOK_MATE_IN_TWO, 6, SearchConfig::default());
    assert_eq!(result.score, mate_in(3));
    assert_eq!(result.pv.len(), 3);

    let end = play(ROOK_MATE_IN_TWO, &result.pv);
    assert!(end.in_check());

    let mut previous = MATE - result.score;
    for plies in 1..result.pv.len() {
        let pos = play(ROOK_MATE_IN_TWO, &result.pv[..plies]);
        let fen = pos.to_string();
        let score = search(&fen, 6, SearchConfig::default()).score;
        let distance = MATE - score.abs();
        assert!(distance < previous, "{fen}: {distance} after {previous}");
        let expected = if plies % 2 == 1 {
            mated_in(distance as usize)
        } else {
            mate_in(distance as usize)
        };
        assert_eq!(score, expected, "{fen}");
        previous = distance;
    }
}

#[test]
fn shortest_mate_is_kept_at_every_depth() {
    // The mating move is a quiet rook check that orders late.
    for depth in 4..=9 {
        let result = search(ROOK_MATE_IN_TWO, depth, SearchConfig::default());
        assert_eq!(result.score, mate_in(3), "depth {depth}");
    }
}

#[test]
fn trebuchet_is_lost_for_the_side_to_move() {
    for fen in [TREBUCHET_WHITE, TREBUCHET_BLACK] {
        let pruned = search(fen, 10, SearchConfig::default());
        assert!(pruned.score < -50, "{fen}: {}", pruned.score);

        let exhaustive = SearchConfig {
            mate_finder: true,
            ..SearchConfig::default()
        };
        let reference = search(fen, 8, exhaustive);
        assert!(reference.score < -50, "{fen}: {}", reference.score);
    }
}

#[test]
fn terminal_positions_score_the_same_at_every_depth() {
    for depth in 1..=6 {
        let stalemate = search(STALEMATE, depth, SearchConfig::default());
        assert_eq!(stalemate.score, DRAW);
        assert!(stalemate.best_move.is_null());

        let mated = search(CHECKMATE, depth, SearchConfig::default());
        assert_eq!(mated.score, mated_in(0));
        assert!(mated.best_move.is_null());
    }
}

#[test]
fn insufficient_material_is_a_draw() {
    let result = search("8/8/4k3/8/8/3NK3/8/8 w - - 0 1", 6, SearchConfig::default());
    assert_eq!(result.score, DRAW);
}
