//! Search: principal variation search over copy-make positions, run by one
//! [`Searcher`] per thread and coordinated by the Lazy SMP [`ThreadPool`].

pub mod control;
mod draw;
pub mod history;
pub mod ordering;
pub mod pool;
pub mod pv;
mod pvs;
mod qsearch;
pub mod see;
pub mod tt;

use tracing::{debug, trace};
use vigil_core::{Move, Position, Square};

use crate::config::SearchConfig;
use crate::eval::{EVAL_LIMIT, Evaluator, PawnCache};
use crate::external::Tablebase;

use control::{POLL_INTERVAL, SearchControl};
use history::{Heuristics, PieceTo};
use pv::PvTable;
use tt::{Bound, TranspositionTable, TtFlags, TtHit};

pub use pool::ThreadPool;

pub const INF: i32 = 30_000;
/// Returned by a node whose search was cut short; never stored or reported.
pub const ABORTED: i32 = INF + 1;
pub const MATE: i32 = 29_000;
pub const DRAW: i32 = 0;
pub const MAX_PLY: usize = 128;
/// Deepest iteration a search will start.
pub const MAX_DEPTH: u8 = (MAX_PLY - 1) as u8;
pub const MATE_THRESHOLD: i32 = MATE - MAX_PLY as i32;
/// Proven tablebase win, ranked below every mate.
pub const TB_WIN: i32 = 27_000;
pub const TB_WIN_THRESHOLD: i32 = TB_WIN - MAX_PLY as i32;

const _: () = assert!(EVAL_LIMIT < TB_WIN_THRESHOLD && TB_WIN < MATE_THRESHOLD);

/// Score for giving mate `ply` plies from the root.
pub const fn mate_in(ply: usize) -> i32 {
    MATE - ply as i32
}

/// Score for being mated `ply` plies from the root.
pub const fn mated_in(ply: usize) -> i32 {
    -MATE + ply as i32
}

pub fn is_mate(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD && score.abs() <= MATE
}

/// Full moves to mate, negative when being mated.
pub fn mate_distance(score: i32) -> Option<i32> {
    if !is_mate(score) {
        return None;
    }
    let plies = MATE - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

/// Result of a whole search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `Move::NULL` only when the root has no legal move.
    pub best_move: Move,
    pub ponder_move: Option<Move>,
    pub pv: Vec<Move>,
    pub score: i32,
    pub nodes: u64,
    pub depth: u8,
    pub seldepth: u8,
}

impl SearchResult {
    fn empty() -> SearchResult {
        SearchResult {
            best_move: Move::NULL,
            ponder_move: None,
            pv: Vec::new(),
            score: 0,
            nodes: 0,
            depth: 0,
            seldepth: 0,
        }
    }

    /// A result decided without searching (book or tablebase root).
    pub(crate) fn instant(mv: Move, score: i32) -> SearchResult {
        SearchResult {
            best_move: mv,
            pv: vec![mv],
            score,
            ..SearchResult::empty()
        }
    }
}

/// Result of one fixed-depth root search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthOutcome {
    pub best_move: Move,
    pub score: i32,
    pub pv: Vec<Move>,
    /// Nodes this searcher has visited since it was created.
    pub nodes: u64,
    /// The stop signal arrived before the search finished; `score` and `pv`
    /// are then meaningless.
    pub aborted: bool,
}

/// Everything the workers of one search share.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub tt: &'a TranspositionTable,
    pub evaluator: &'a dyn Evaluator,
    pub tablebase: &'a dyn Tablebase,
    pub config: &'a SearchConfig,
    pub control: &'a SearchControl,
}

/// Per-thread state kept by the pool between searches.
#[derive(Default)]
pub struct ThreadData {
    pub heuristics: Heuristics,
    pub pawns: PawnCache,
}

impl ThreadData {
    pub fn new() -> ThreadData {
        ThreadData::default()
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    static_eval: Option<i32>,
    /// Move made from this ply; `Move::NULL` after a null move.
    current: Move,
    played: Option<PieceTo>,
    /// Move skipped by a singular-extension verification search.
    excluded: Move,
    /// Square the null-move refutation landed on.
    threat: Option<Square>,
    double_extensions: u8,
    plies_from_null: usize,
}

impl Frame {
    const EMPTY: Frame = Frame {
        static_eval: None,
        current: Move::NULL,
        played: None,
        excluded: Move::NULL,
        threat: None,
        double_extensions: 0,
        plies_from_null: 0,
    };
}

/// One search thread's view of the tree.
pub struct Searcher<'a> {
    ctx: SearchContext<'a>,
    data: &'a mut ThreadData,
    id: usize,
    nodes: u64,
    seldepth: usize,
    stopped: bool,
    root_depth: i32,
    /// Game history hashes followed by the hashes of the current line.
    path: Vec<u64>,
    root_index: usize,
    stack: Vec<Frame>,
    pv: Box<PvTable>,
    /// Null move is disabled above this ply while a verification search runs.
    nmp_min_ply: usize,
}

impl<'a> Searcher<'a> {
    /// `game_history` holds the hashes of the positions played before the
    /// root, oldest first; the root itself may be included as the last one.
    pub fn new(
        ctx: SearchContext<'a>,
        data: &'a mut ThreadData,
        id: usize,
        game_history: &[u64],
    ) -> Searcher<'a> {
        let mut path = Vec::with_capacity(game_history.len() + MAX_PLY + 2);
        path.extend_from_slice(game_history);
        Searcher {
            ctx,
            data,
            id,
            nodes: 0,
            seldepth: 0,
            stopped: false,
            root_depth: 0,
            root_index: path.len(),
            path,
            stack: vec![Frame::EMPTY; MAX_PLY + 4],
            pv: Box::new(PvTable::new()),
            nmp_min_ply: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// One root search at `depth` inside `(alpha, beta)`.
    pub fn search_to_depth(
        &mut self,
        pos: &Position,
        depth: u8,
        window: (i32, i32),
    ) -> DepthOutcome {
        self.prepare_root(pos);
        self.root_depth = i32::from(depth.max(1));
        let (alpha, beta) = window;
        let score = self.pvs(pos, self.root_depth, 0, alpha, beta, true, false);
        let pv = self.pv.line(0).to_vec();
        DepthOutcome {
            best_move: pv.first().copied().unwrap_or(Move::NULL),
            score,
            pv,
            nodes: self.nodes,
            aborted: self.stopped,
        }
    }

    /// Iterative deepening from `start_depth` to `max_depth` with aspiration
    /// windows. `on_iter(depth, score, nodes, pv)` runs after every
    /// completed iteration; an aborted iteration is discarded.
    pub fn iterate<F>(
        &mut self,
        pos: &Position,
        max_depth: u8,
        start_depth: u8,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(u8, i32, u64, &[Move]),
    {
        let mut result = SearchResult::empty();
        let mut prev_score = 0;
        for depth in start_depth.max(1)..=max_depth {
            if self.ctx.control.should_stop_iterating() {
                break;
            }
            self.seldepth = 0;
            let outcome = self.aspiration(pos, depth, prev_score);
            if outcome.aborted {
                break;
            }
            prev_score = outcome.score;
            result = SearchResult {
                best_move: outcome.best_move,
                ponder_move: outcome.pv.get(1).copied(),
                score: outcome.score,
                nodes: self.nodes,
                depth,
                seldepth: self.seldepth.min(usize::from(u8::MAX)) as u8,
                pv: outcome.pv,
            };
            debug!(
                thread = self.id,
                depth,
                score = result.score,
                nodes = self.nodes,
                pv = %format_line(&result.pv),
                "iteration complete"
            );
            on_iter(depth, result.score, self.ctx.control.nodes(), &result.pv);
            if result.best_move.is_null() {
                // No legal move at the root; deeper searches say the same.
                break;
            }
        }
        self.ctx.control.add_nodes(self.nodes % POLL_INTERVAL);
        result.nodes = self.nodes;
        result
    }

    fn aspiration(&mut self, pos: &Position, depth: u8, prev_score: i32) -> DepthOutcome {
        let cfg = self.ctx.config;
        let mut delta = cfg.aspiration_window;
        let (mut alpha, mut beta) =
            if i32::from(depth) >= cfg.aspiration_min_depth && prev_score.abs() < TB_WIN_THRESHOLD {
                ((prev_score - delta).max(-INF), (prev_score + delta).min(INF))
            } else {
                (-INF, INF)
            };
        loop {
            let outcome = self.search_to_depth(pos, depth, (alpha, beta));
            if outcome.aborted {
                return outcome;
            }
            if outcome.score <= alpha && alpha > -INF {
                let score = outcome.score;
                trace!(thread = self.id, depth, score, alpha, "aspiration fail low");
                beta = (alpha + beta) / 2;
                alpha = (outcome.score - delta).max(-INF);
            } else if outcome.score >= beta && beta < INF {
                let score = outcome.score;
                trace!(thread = self.id, depth, score, beta, "aspiration fail high");
                beta = (outcome.score + delta).min(INF);
            } else {
                return outcome;
            }
            delta *= 2;
            if delta > 1000 {
                alpha = -INF;
                beta = INF;
            }
        }
    }

    fn prepare_root(&mut self, pos: &Position) {
        self.path.truncate(self.root_index);
        if self.path.last() == Some(&pos.hash()) {
            self.path.pop();
            self.root_index -= 1;
        }
        self.path.push(pos.hash());
        self.stack.fill(Frame::EMPTY);
        self.stack[0].plies_from_null = usize::MAX;
        self.nmp_min_ply = 0;
        self.pv.clear(0);
    }

    /// Count a node; true once this search has to unwind.
    fn poll(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        self.nodes += 1;
        if self.nodes % POLL_INTERVAL == 0 && self.ctx.control.poll(POLL_INTERVAL) {
            self.stopped = true;
        }
        self.stopped
    }

    fn evaluate(&mut self, pos: &Position) -> i32 {
        self.ctx
            .evaluator
            .evaluate(pos, &mut self.data.pawns)
            .score
            .clamp(-EVAL_LIMIT, EVAL_LIMIT)
    }

    fn tt_probe(&self, hash: u64, ply: usize) -> Option<TtHit> {
        if self.ctx.config.use_tt {
            self.ctx.tt.probe(hash, ply)
        } else {
            None
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn tt_store(
        &self,
        hash: u64,
        ply: usize,
        mv: Move,
        score: i32,
        eval: Option<i32>,
        bound: Bound,
        depth: i32,
        flags: TtFlags,
    ) {
        if self.ctx.config.use_tt {
            self.ctx.tt.store(hash, ply, mv, score, eval, bound, depth, flags);
        }
    }

    /// Make `mv` the current move at `ply` and step onto `child`.
    fn enter(&mut self, ply: usize, mv: Move, played: Option<PieceTo>, child: &Position) {
        let frame = &mut self.stack[ply];
        frame.current = mv;
        frame.played = played;
        let from_null = frame.plies_from_null.saturating_add(1);
        let next = &mut self.stack[ply + 1];
        next.plies_from_null = if mv.is_null() { 0 } else { from_null };
        next.excluded = Move::NULL;
        self.path.push(child.hash());
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    fn is_draw(&self, pos: &Position, ply: usize) -> bool {
        if pos.is_insufficient_material() {
            return true;
        }
        if draw::fifty_move_draw(pos) {
            return true;
        }
        let lookback = usize::from(pos.halfmove_clock()).min(self.stack[ply].plies_from_null);
        draw::is_repetition(&self.path, self.root_index, lookback)
    }
}

fn format_line(moves: &[Move]) -> String {
    moves.iter().map(|mv| mv.to_uci()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use crate::config::SearchConfig;
    use crate::eval::ClassicalEvaluator;
    use crate::external::NoTablebase;

    const SCHOLARS_MATE: &str =
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    fn run<R>(config: SearchConfig, f: impl FnOnce(&mut Searcher<'_>) -> R) -> R {
        run_with(config, &[], false, f)
    }

    fn run_with<R>(
        config: SearchConfig,
        history: &[u64],
        stopped: bool,
        f: impl FnOnce(&mut Searcher<'_>) -> R,
    ) -> R {
        let tt = TranspositionTable::new(4);
        let evaluator = ClassicalEvaluator::default();
        let control = SearchControl::infinite(Arc::new(AtomicBool::new(stopped)));
        let ctx = SearchContext {
            tt: &tt,
            evaluator: &evaluator,
            tablebase: &NoTablebase,
            config: &config,
            control: &control,
        };
        let mut data = ThreadData::new();
        let mut searcher = Searcher::new(ctx, &mut data, 0, history);
        f(&mut searcher)
    }

    fn search(fen: &str, depth: u8) -> SearchResult {
        let pos: Position = fen.parse().unwrap();
        run(SearchConfig::default(), |s| s.iterate(&pos, depth, 1, |_, _, _, _| {}))
    }

    #[test]
    fn mate_helpers() {
        assert_eq!(mate_in(1), MATE - 1);
        assert_eq!(mated_in(0), -MATE);
        assert!(is_mate(mate_in(5)) && is_mate(mated_in(5)));
        assert!(!is_mate(TB_WIN) && !is_mate(EVAL_LIMIT));
        assert_eq!(mate_distance(mate_in(1)), Some(1));
        assert_eq!(mate_distance(mate_in(3)), Some(2));
        assert_eq!(mate_distance(mated_in(2)), Some(-1));
        assert_eq!(mate_distance(100), None);
    }

    #[test]
    fn depth_one_returns_a_legal_move() {
        let result = search(vigil_core::STARTING_FEN, 1);
        let pos = Position::startpos();
        assert!(pos.apply(result.best_move).is_some());
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn finds_mate_in_one() {
        let result = search(SCHOLARS_MATE, 3);
        assert_eq!(result.best_move.to_uci(), "h5f7");
        assert_eq!(result.score, mate_in(1));
    }

    #[test]
    fn stalemate_scores_zero_with_no_move() {
        let result = search("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(result.score, DRAW);
        assert!(result.best_move.is_null());
    }

    #[test]
    fn checkmated_root_scores_mated() {
        let result = search("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(result.score, mated_in(0));
        assert!(result.best_move.is_null());
    }

    #[test]
    fn callback_sees_every_depth_with_a_pv() {
        let pos = Position::startpos();
        let mut depths = Vec::new();
        run(SearchConfig::default(), |s| {
            s.iterate(&pos, 4, 1, |depth, _, _, pv| {
                assert!(!pv.is_empty() && !pv[0].is_null());
                depths.push(depth);
            })
        });
        assert_eq!(depths, [1, 2, 3, 4]);
    }

    #[test]
    fn pv_starts_with_best_move_and_is_playable() {
        let result = search(vigil_core::STARTING_FEN, 5);
        assert_eq!(result.pv.first(), Some(&result.best_move));
        assert_eq!(result.ponder_move, result.pv.get(1).copied());
        let mut pos = Position::startpos();
        for &mv in &result.pv {
            pos = pos.apply(mv).unwrap();
        }
    }

    #[test]
    fn search_to_depth_respects_window() {
        let pos = Position::startpos();
        let outcome = run(SearchConfig::default(), |s| s.search_to_depth(&pos, 3, (-INF, INF)));
        assert!(!outcome.aborted);
        assert!(outcome.score.abs() < 200);
        let narrow = run(SearchConfig::default(), |s| s.search_to_depth(&pos, 3, (500, 501)));
        assert!(narrow.score <= 500, "fail low stays at or under alpha");
    }

    #[test]
    fn pre_stopped_search_reports_nothing() {
        let pos = Position::startpos();
        let result = run_with(SearchConfig::default(), &[], true, |s| {
            s.iterate(&pos, 10, 1, |_, _, _, _| {})
        });
        assert_eq!(result.depth, 0);
        assert!(result.best_move.is_null());
    }

    #[test]
    fn repetition_in_game_history_is_seen() {
        // Both sides shuffle knights; the root already occurred twice.
        let start = Position::startpos();
        let mut history = vec![start.hash()];
        let mut pos = start;
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = pos.parse_move(uci).unwrap();
            pos = pos.apply(mv).unwrap();
            history.push(pos.hash());
        }
        assert_eq!(pos.hash(), start.hash());
        run_with(SearchConfig::default(), &history, false, |s| {
            s.prepare_root(&pos);
            assert_eq!(s.path.len(), history.len());
            assert!(draw::is_repetition(&s.path, s.root_index, 8));
            let outcome = s.search_to_depth(&pos, 2, (-INF, INF));
            assert!(!outcome.aborted);
        });
    }
}
