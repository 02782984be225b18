//! Integration tests for the Lazy SMP thread pool.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use vigil_core::Position;
use vigil_engine::search::{MATE_THRESHOLD, mate_in};
use vigil_engine::{EngineConfig, SearchLimits, SearchResult, ThreadPool};

const SCHOLARS_MATE_FEN: &str =
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

const SICILIAN_FEN: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2";

const RUY_LOPEZ_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";

const ENDGAME_FEN: &str = "8/8/8/3k4/8/3K4/4P3/8 w - - 0 1";

fn pool(threads: usize) -> ThreadPool {
    let config = EngineConfig {
        threads,
        ..EngineConfig::default()
    };
    ThreadPool::new(config).unwrap()
}

fn search_with_threads(pos: &Position, depth: u8, threads: usize) -> SearchResult {
    pool(threads).search(pos, &SearchLimits::depth(depth), &[], |_, _, _, _| {})
}

fn assert_legal(pos: &Position, result: &SearchResult) {
    assert!(
        pos.apply(result.best_move).is_some() && pos.is_pseudo_legal(result.best_move),
        "{} is not legal in {pos}",
        result.best_move
    );
}

#[test]
fn single_thread_returns_legal_move() {
    let pos = Position::startpos();
    let result = search_with_threads(&pos, 4, 1);
    assert_legal(&pos, &result);
    assert_eq!(result.depth, 4);
}

#[test]
fn single_thread_finds_mate_in_one() {
    let pos: Position = SCHOLARS_MATE_FEN.parse().unwrap();
    let result = search_with_threads(&pos, 2, 1);
    assert_eq!(result.best_move.to_uci(), "h5f7");
    assert_eq!(result.score, mate_in(1));
}

#[test]
fn multi_thread_returns_legal_move() {
    let pos = Position::startpos();
    for threads in [2, 4] {
        let result = search_with_threads(&pos, 4, threads);
        assert_legal(&pos, &result);
    }
}

#[test]
fn multi_thread_finds_mate_in_one() {
    let pos: Position = SCHOLARS_MATE_FEN.parse().unwrap();
    let result = search_with_threads(&pos, 3, 4);
    assert_eq!(result.best_move.to_uci(), "h5f7");
    assert!(result.score > MATE_THRESHOLD, "score {} should indicate mate", result.score);
}

#[test]
fn multi_thread_various_positions() {
    let positions = [
        ("Sicilian Defence", SICILIAN_FEN),
        ("Ruy Lopez", RUY_LOPEZ_FEN),
        ("King+pawn endgame", ENDGAME_FEN),
    ];
    for (name, fen) in positions {
        let pos: Position = fen.parse().unwrap_or_else(|_| panic!("invalid FEN for {name}"));
        let result = search_with_threads(&pos, 5, 4);
        assert_legal(&pos, &result);
        assert_eq!(result.pv.first(), Some(&result.best_move), "{name}");
    }
}

#[test]
fn stop_signal_terminates_all_threads() {
    let (tx, rx) = std::sync::mpsc::channel::<SearchResult>();
    let mut pool = pool(4);
    let stop = pool.stop_flag();
    thread::spawn(move || {
        let limits = SearchLimits::default();
        let result = pool.search(&Position::startpos(), &limits, &[], |_, _, _, _| {});
        let _ = tx.send(result);
    });
    thread::sleep(Duration::from_millis(50));
    stop.store(true, Ordering::Relaxed);

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("search with stop signal did not complete within 5 seconds");
    assert!(result.depth < 100, "stopped late, depth {}", result.depth);
    assert!(Position::startpos().apply(result.best_move).is_some());
}

#[test]
fn node_budget_stops_the_search() {
    let pos = Position::startpos();
    let mut pool = pool(2);
    let result = pool.search(&pos, &SearchLimits::nodes(20_000), &[], |_, _, _, _| {});
    assert_legal(&pos, &result);
    // Workers notice the budget at their next poll.
    assert!(result.nodes < 20_000 + 2 * 2 * 1024, "nodes {}", result.nodes);
}

#[test]
fn multi_thread_reports_total_nodes() {
    let pos = Position::startpos();
    let single = search_with_threads(&pos, 6, 1);
    let quad = search_with_threads(&pos, 6, 4);
    assert!(single.nodes > 0);
    assert!(quad.nodes > 0);
}

#[test]
fn on_iter_fires_once_per_main_thread_depth() {
    let pos = Position::startpos();
    let mut pool = pool(4);
    let mut depths_seen = Vec::new();
    pool.search(&pos, &SearchLimits::depth(3), &[], |depth, _, _, pv| {
        assert!(!pv.is_empty() && !pv[0].is_null());
        depths_seen.push(depth);
    });
    assert_eq!(depths_seen, [1, 2, 3]);
}

#[test]
fn heuristics_survive_between_searches() {
    let pos: Position = RUY_LOPEZ_FEN.parse().unwrap();
    let mut pool = pool(2);
    let first = pool.search(&pos, &SearchLimits::depth(6), &[], |_, _, _, _| {});
    let second = pool.search(&pos, &SearchLimits::depth(6), &[], |_, _, _, _| {});
    assert_legal(&pos, &first);
    assert_legal(&pos, &second);
    pool.clear();
    assert_eq!(pool.hashfull(), 0);
}
