//! Move ordering: every generated move is scored once, then handed out
//! best-first by selection sort.

use std::sync::OnceLock;

use vigil_core::{Move, MoveList, Position, Square, generate, phase};

use super::history::{Heuristics, PieceTo};
use super::see::{see, value, victim_value};

const TT_MOVE: i32 = 30_000_000;
const GOOD_CAPTURE: i32 = 20_000_000;
const PROMOTION: i32 = 15_000_000;
const KILLER_1: i32 = 14_000_000;
const KILLER_2: i32 = 13_000_000;
const COUNTER: i32 = 12_000_000;
const CASTLE: i32 = -1_000_000;
const BAD_CAPTURE: i32 = -2_000_000;

/// Extra credit for moving the piece the null-move refutation attacked.
const THREAT_ESCAPE: i32 = 4_096;
/// Recaptures on the square the opponent just moved to.
const RECAPTURE: i32 = 512;

/// What the main picker knows about the node beyond the position itself.
pub struct OrderingContext<'a> {
    pub heuristics: &'a Heuristics,
    pub killers: [Move; 2],
    pub counter: Move,
    pub prev: Option<PieceTo>,
    pub threat: Option<Square>,
}

pub struct MovePicker {
    list: MoveList,
    cursor: usize,
}

impl MovePicker {
    /// All moves (evasions in check), ordered for the main search.
    pub fn new(pos: &Position, tt_move: Move, ctx: &OrderingContext<'_>) -> MovePicker {
        let mut list = if pos.in_check() {
            generate::<phase::Evasions>(pos)
        } else {
            generate::<phase::All>(pos)
        };
        for i in 0..list.len() {
            let Some(mv) = list.get(i) else { break };
            let score = if mv == tt_move {
                TT_MOVE
            } else {
                main_score(pos, mv, ctx)
            };
            list.set_score(i, score);
        }
        MovePicker {
            list,
            cursor: 0,
        }
    }

    /// Noisy moves only (evasions in check), for quiescence and probCut.
    pub fn noisy(pos: &Position, tt_move: Move) -> MovePicker {
        let mut list = if pos.in_check() {
            generate::<phase::Evasions>(pos)
        } else {
            generate::<phase::Captures>(pos)
        };
        for i in 0..list.len() {
            let Some(mv) = list.get(i) else { break };
            let score = if mv == tt_move {
                TT_MOVE
            } else if mv.is_noisy() {
                noisy_score(pos, mv, None)
            } else {
                0
            };
            list.set_score(i, score);
        }
        MovePicker {
            list,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Next best move with its ordering score.
    pub fn pick_next(&mut self) -> Option<(Move, i32)> {
        if self.cursor >= self.list.len() {
            return None;
        }
        let mut best = self.cursor;
        for i in self.cursor + 1..self.list.len() {
            if self.list.score(i) > self.list.score(best) {
                best = i;
            }
        }
        self.list.swap(self.cursor, best);
        let index = self.cursor;
        self.cursor += 1;
        Some((self.list.get(index)?, self.list.score(index)))
    }
}

/// Whether an ordering score came from the promotion bucket or above.
pub fn is_good_noisy(score: i32) -> bool {
    score >= PROMOTION
}

fn noisy_score(pos: &Position, mv: Move, prev_to: Option<Square>) -> i32 {
    if !mv.is_capture() {
        let promo = mv.promotion().map_or(0, value);
        return PROMOTION + promo;
    }
    let exchange = see(pos, mv);
    let recapture = if prev_to == Some(mv.to()) { RECAPTURE } else { 0 };
    if exchange >= 0 {
        GOOD_CAPTURE + victim_value(pos, mv) * 4_096 + exchange.min(4_095) + recapture
    } else {
        BAD_CAPTURE + exchange + recapture
    }
}

fn main_score(pos: &Position, mv: Move, ctx: &OrderingContext<'_>) -> i32 {
    if mv.is_noisy() {
        return noisy_score(pos, mv, ctx.prev.map(|p| p.to));
    }
    if mv == ctx.killers[0] {
        return KILLER_1;
    }
    if mv == ctx.killers[1] {
        return KILLER_2;
    }
    if mv == ctx.counter {
        return COUNTER;
    }
    if mv.is_castle() {
        return CASTLE;
    }
    let Some(piece) = pos.piece_on(mv.from()) else {
        return CASTLE;
    };
    let key = PieceTo { piece, to: mv.to() };
    let escape = if ctx.threat == Some(mv.from()) { THREAT_ESCAPE } else { 0 };
    ctx.heuristics.quiet_score(key, ctx.prev) + escape
}

/// Late-move reduction table in 1024ths of a ply, `[move_number][depth]`.
static LMR_TABLE: OnceLock<[[i32; 64]; 64]> = OnceLock::new();

fn lmr_table() -> &'static [[i32; 64]; 64] {
    LMR_TABLE.get_or_init(|| {
        let mut table = [[0i32; 64]; 64];
        for (moves, row) in table.iter_mut().enumerate().skip(1) {
            for (depth, cell) in row.iter_mut().enumerate().skip(1) {
                let r = 0.76 + (moves as f64).ln() * (depth as f64).ln() / 2.32;
                *cell = (r * 1024.0) as i32;
            }
        }
        table
    })
}

/// Base reduction in whole plies for the `move_number`-th move at `depth`.
pub fn lmr_reduction(depth: i32, move_number: usize) -> i32 {
    let depth = depth.clamp(0, 63) as usize;
    lmr_table()[move_number.min(63)][depth] / 1024
}
