//! Lazy SMP thread pool for parallel search.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};
use vigil_core::{Move, Position, generate, phase};

use crate::config::{ConfigError, EngineConfig, MAX_THREADS};
use crate::eval::{ClassicalEvaluator, Evaluator};
use crate::external::{NoBook, NoTablebase, OpeningBook, Tablebase, Wdl};

use super::control::{SearchControl, SearchLimits};
use super::tt::TranspositionTable;
use super::{DRAW, MAX_DEPTH, SearchContext, SearchResult, Searcher, TB_WIN, ThreadData};

/// Owns the shared transposition table and one [`ThreadData`] per search
/// thread. Thread 0 reports iterations; the others only feed the table.
pub struct ThreadPool {
    tt: TranspositionTable,
    config: EngineConfig,
    evaluator: Box<dyn Evaluator>,
    tablebase: Box<dyn Tablebase>,
    book: Box<dyn OpeningBook>,
    workers: Vec<ThreadData>,
    stop: Arc<AtomicBool>,
}

impl ThreadPool {
    pub fn new(config: EngineConfig) -> Result<ThreadPool, ConfigError> {
        config.validate()?;
        let workers = (0..config.threads).map(|_| ThreadData::new()).collect();
        Ok(ThreadPool {
            tt: TranspositionTable::new(config.hash_mb),
            config,
            evaluator: Box::new(ClassicalEvaluator::default()),
            tablebase: Box::new(NoTablebase),
            book: Box::new(NoBook),
            workers,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> ThreadPool {
        self.evaluator = evaluator;
        self
    }

    pub fn with_tablebase(mut self, tablebase: Box<dyn Tablebase>) -> ThreadPool {
        self.tablebase = tablebase;
        self
    }

    pub fn with_book(mut self, book: Box<dyn OpeningBook>) -> ThreadPool {
        self.book = book;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Out-of-range counts are clamped rather than refused.
    pub fn set_threads(&mut self, threads: usize) {
        let clamped = threads.clamp(1, MAX_THREADS);
        if clamped != threads {
            warn!(requested = threads, using = clamped, "thread count out of range");
        }
        self.config.threads = clamped;
        self.workers.resize_with(clamped, ThreadData::new);
    }

    pub fn resize_tt(&mut self, mb: usize) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.hash_mb = mb;
        config.validate()?;
        self.tt.resize(mb);
        self.config = config;
        Ok(())
    }

    /// Forget everything learned: table entries and per-thread histories.
    pub fn clear(&mut self) {
        self.tt.clear();
        for worker in &mut self.workers {
            *worker = ThreadData::new();
        }
    }

    /// Raise this flag from another thread to end the running search.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull()
    }

    /// Search `pos` within `limits`. `game_history` holds the hashes of the
    /// positions played before `pos`, oldest first. `on_iter(depth, score,
    /// nodes, pv)` is called from the calling thread after each iteration
    /// of thread 0.
    pub fn search<F>(
        &mut self,
        pos: &Position,
        limits: &SearchLimits,
        game_history: &[u64],
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(u8, i32, u64, &[Move]),
    {
        self.stop.store(false, Ordering::Relaxed);

        if let Some(result) = self.probe_book(pos) {
            return result;
        }
        if let Some(result) = self.probe_root_tablebase(pos) {
            return result;
        }

        self.tt.new_generation();
        for worker in &mut self.workers {
            worker.heuristics.age();
        }

        let control = SearchControl::new(limits, Arc::clone(&self.stop));
        let max_depth = limits.depth.unwrap_or(MAX_DEPTH).clamp(1, MAX_DEPTH);
        info!(threads = self.workers.len(), max_depth, fen = %pos, "search started");

        let ctx = SearchContext {
            tt: &self.tt,
            evaluator: self.evaluator.as_ref(),
            tablebase: self.tablebase.as_ref(),
            config: &self.config.search,
            control: &control,
        };
        let Some((main, helpers)) = self.workers.split_first_mut() else {
            return SearchResult::empty();
        };

        let results = std::thread::scope(|s| {
            let handles: Vec<_> = helpers
                .iter_mut()
                .enumerate()
                .map(|(i, data)| {
                    let id = i + 1;
                    // Odd helpers skip depth 1 so the threads drift apart.
                    let start_depth = 1 + (id % 2) as u8;
                    s.spawn(move || {
                        let mut searcher = Searcher::new(ctx, data, id, game_history);
                        searcher.iterate(pos, max_depth, start_depth, |_, _, _, _| {})
                    })
                })
                .collect();

            let main_result =
                Searcher::new(ctx, main, 0, game_history).iterate(pos, max_depth, 1, &mut on_iter);
            control.stop();

            let mut results = vec![main_result];
            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(_) => warn!("helper search thread panicked"),
                }
            }
            results
        });

        let mut result = pick_result(results);
        result.nodes = control.nodes();
        if result.depth == 0
            && let Some(mv) = first_legal_move(pos)
        {
            debug!(mv = %mv, "no iteration completed, playing the first legal move");
            result = SearchResult {
                nodes: result.nodes,
                ..SearchResult::instant(mv, DRAW)
            };
        }
        info!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            best = %result.best_move,
            elapsed_ms = control.elapsed().as_millis() as u64,
            "search finished"
        );
        result
    }

    fn probe_book(&self, pos: &Position) -> Option<SearchResult> {
        let mv = self.book.lookup(pos.hash())?;
        if !pos.is_pseudo_legal(mv) || pos.apply(mv).is_none() {
            warn!(mv = %mv, fen = %pos, "book move is not legal here, ignoring it");
            return None;
        }
        info!(mv = %mv, "book move");
        Some(SearchResult::instant(mv, DRAW))
    }

    fn probe_root_tablebase(&self, pos: &Position) -> Option<SearchResult> {
        if pos.piece_count() > self.tablebase.max_pieces() || !pos.castling().is_empty() {
            return None;
        }
        let (mv, dtz) = self.tablebase.probe_root(pos)?;
        if !pos.is_pseudo_legal(mv) || pos.apply(mv).is_none() {
            warn!(mv = %mv, "tablebase move is not legal here, ignoring it");
            return None;
        }
        let score = match self.tablebase.probe_wdl(pos) {
            Some(Wdl::Win) => TB_WIN,
            Some(Wdl::Loss) => -TB_WIN,
            _ => DRAW,
        };
        info!(mv = %mv, dtz, score, "tablebase root move");
        Some(SearchResult::instant(mv, score))
    }
}

/// Deepest completed iteration wins; thread 0 wins ties.
fn pick_result(results: Vec<SearchResult>) -> SearchResult {
    let mut best: Option<SearchResult> = None;
    for result in results {
        if result.depth == 0 {
            continue;
        }
        match &best {
            Some(b) if result.depth <= b.depth => {}
            _ => best = Some(result),
        }
    }
    best.unwrap_or_else(SearchResult::empty)
}

fn first_legal_move(pos: &Position) -> Option<Move> {
    let moves = if pos.in_check() {
        generate::<phase::Evasions>(pos)
    } else {
        generate::<phase::All>(pos)
    };
    moves.iter().find(|&mv| pos.apply(mv).is_some())
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("tt", &self.tt)
            .field("threads", &self.workers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::external::MemoryBook;
    use crate::search::mated_in;

    fn result(depth: u8, uci_from: vigil_core::Square) -> SearchResult {
        let mv = Move::new(uci_from, vigil_core::Square::E4, vigil_core::MoveKind::Quiet);
        SearchResult {
            depth,
            ..SearchResult::instant(mv, 0)
        }
    }

    #[test]
    fn deepest_result_wins_and_main_breaks_ties() {
        use vigil_core::Square;
        let picked = pick_result(vec![
            result(5, Square::E2),
            result(6, Square::D3),
            result(6, Square::F3),
        ]);
        assert_eq!(picked.best_move.from(), Square::D3);
        let picked = pick_result(vec![result(6, Square::E2), result(6, Square::D3)]);
        assert_eq!(picked.best_move.from(), Square::E2);
    }

    #[test]
    fn completed_iteration_without_a_move_is_kept() {
        let mated = SearchResult {
            depth: 2,
            ..SearchResult::instant(Move::NULL, mated_in(0))
        };
        let picked = pick_result(vec![mated.clone(), SearchResult::empty()]);
        assert_eq!(picked, mated);
        assert_eq!(pick_result(vec![SearchResult::empty()]).depth, 0);
    }

    #[test]
    fn checkmated_root_reports_the_mate() {
        let pos: Position = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1".parse().unwrap();
        for threads in [1, 3] {
            let config = EngineConfig {
                threads,
                ..EngineConfig::default()
            };
            let mut pool = ThreadPool::new(config).unwrap();
            let result = pool.search(&pos, &SearchLimits::depth(3), &[], |_, _, _, _| {});
            assert!(result.best_move.is_null());
            assert_eq!(result.score, mated_in(0));
            assert!(result.depth >= 1);
        }
    }

    #[test]
    fn thread_count_is_clamped() {
        let mut pool = ThreadPool::new(EngineConfig::default()).unwrap();
        pool.set_threads(0);
        assert_eq!(pool.threads(), 1);
        pool.set_threads(MAX_THREADS + 10);
        assert_eq!(pool.threads(), MAX_THREADS);
        pool.set_threads(3);
        assert_eq!(pool.threads(), 3);
        assert_eq!(pool.config().threads, 3);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = EngineConfig {
            hash_mb: 0,
            ..EngineConfig::default()
        };
        assert!(ThreadPool::new(config).is_err());
        let mut pool = ThreadPool::new(EngineConfig::default()).unwrap();
        assert!(pool.resize_tt(0).is_err());
        assert_eq!(pool.config().hash_mb, 16);
        assert!(pool.resize_tt(2).is_ok());
    }

    #[test]
    fn book_move_short_circuits_search() {
        let pos = Position::startpos();
        let mut book = MemoryBook::new();
        let mv = pos.parse_move("d2d4").unwrap();
        assert!(book.insert(&pos, mv));
        let mut pool = ThreadPool::new(EngineConfig::default()).unwrap().with_book(Box::new(book));
        let result = pool.search(&pos, &SearchLimits::depth(10), &[], |_, _, _, _| {
            panic!("no iteration expected for a book move")
        });
        assert_eq!(result.best_move, mv);
        assert_eq!(result.nodes, 0);
    }

    struct OneMoveBook(Move);

    impl OpeningBook for OneMoveBook {
        fn lookup(&self, _hash: u64) -> Option<Move> {
            Some(self.0)
        }
    }

    #[test]
    fn illegal_book_move_falls_back_to_search() {
        let pos = Position::startpos();
        let bogus = Move::new(
            vigil_core::Square::E1,
            vigil_core::Square::E3,
            vigil_core::MoveKind::Quiet,
        );
        let mut pool = ThreadPool::new(EngineConfig::default())
            .unwrap()
            .with_book(Box::new(OneMoveBook(bogus)));
        let result = pool.search(&pos, &SearchLimits::depth(2), &[], |_, _, _, _| {});
        assert_ne!(result.best_move, bogus);
        assert_eq!(result.depth, 2);
    }

    struct KrkTablebase;

    impl Tablebase for KrkTablebase {
        fn max_pieces(&self) -> u32 {
            3
        }

        fn probe_wdl(&self, _pos: &Position) -> Option<Wdl> {
            Some(Wdl::Win)
        }

        fn probe_root(&self, pos: &Position) -> Option<(Move, u32)> {
            Some((pos.parse_move("a1a7")?, 9))
        }
    }

    #[test]
    fn root_tablebase_move_is_played() {
        let pos: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
        let mut pool = ThreadPool::new(EngineConfig::default())
            .unwrap()
            .with_tablebase(Box::new(KrkTablebase));
        let result = pool.search(&pos, &SearchLimits::depth(5), &[], |_, _, _, _| {});
        assert_eq!(result.best_move.to_uci(), "a1a7");
        assert_eq!(result.score, TB_WIN);
    }

    #[test]
    fn stop_flag_before_search_still_yields_a_move() {
        let pos = Position::startpos();
        let mut pool = ThreadPool::new(EngineConfig::default()).unwrap();
        let limits = SearchLimits::movetime(std::time::Duration::ZERO);
        let result = pool.search(&pos, &limits, &[], |_, _, _, _| {});
        assert!(pos.apply(result.best_move).is_some());
    }
}
