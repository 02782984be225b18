//! Quiescence search: captures and promotions until the position is quiet.

use vigil_core::{Bitboard, Move, PieceKind, Position};

use super::history::PieceTo;
use super::ordering::MovePicker;
use super::see::{see_ge, value, victim_value};
use super::tt::{Bound, TtFlags};
use super::{ABORTED, DRAW, INF, MAX_PLY, Searcher, mated_in};

/// Most the side to move could gain with one noisy move.
fn best_gain(pos: &Position) -> i32 {
    let us = pos.side_to_move();
    let them = pos.side(!us);
    let victim = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ]
    .into_iter()
    .find(|&kind| (pos.pieces(kind) & them).any())
    .map_or(0, value);
    let seventh = Bitboard::relative_rank(us, 6);
    let promoting = (pos.pieces_of(PieceKind::Pawn, us) & seventh).any();
    if promoting {
        victim + value(PieceKind::Queen) - value(PieceKind::Pawn)
    } else {
        victim
    }
}

impl Searcher<'_> {
    /// `qply` counts quiescence plies below the main search; past the
    /// configured limit only recaptures are tried.
    pub(super) fn qsearch(
        &mut self,
        pos: &Position,
        ply: usize,
        qply: usize,
        mut alpha: i32,
        beta: i32,
        pv_node: bool,
    ) -> i32 {
        self.pv.clear(ply);
        if self.poll() {
            return ABORTED;
        }
        self.seldepth = self.seldepth.max(ply + 1);

        let cfg = self.ctx.config;
        let in_check = pos.in_check();
        if ply > 0 && self.is_draw(pos, ply) {
            return DRAW;
        }
        if ply >= MAX_PLY {
            return if in_check { DRAW } else { self.evaluate(pos) };
        }

        let hash = pos.hash();
        let flags = TtFlags { pv: pv_node, in_check };
        let tt_depth = if in_check { 0 } else { -1 };
        let tt_hit = self.tt_probe(hash, ply);
        if let Some(hit) = tt_hit
            && !pv_node
            && hit.depth >= tt_depth
            && hit.bound.cuts(hit.score, alpha, beta)
        {
            return hit.score;
        }

        let mut static_eval = None;
        let mut best_score = -INF;
        let mut futility_base = -INF;
        if !in_check {
            let raw = match tt_hit.and_then(|hit| hit.eval) {
                Some(e) => e,
                None => self.evaluate(pos),
            };
            static_eval = Some(raw);
            let mut stand_pat = raw;
            if let Some(hit) = tt_hit {
                let tighter = match hit.bound {
                    Bound::Exact => true,
                    Bound::Lower => hit.score > raw,
                    Bound::Upper => hit.score < raw,
                    Bound::None => false,
                };
                if tighter {
                    stand_pat = hit.score;
                }
            }
            if stand_pat >= beta {
                if tt_hit.is_none() {
                    self.tt_store(
                        hash,
                        ply,
                        Move::NULL,
                        stand_pat,
                        static_eval,
                        Bound::Lower,
                        tt_depth,
                        flags,
                    );
                }
                return stand_pat;
            }
            if stand_pat + best_gain(pos) + cfg.qsearch_futility_margin < alpha {
                return alpha;
            }
            alpha = alpha.max(stand_pat);
            best_score = stand_pat;
            futility_base = stand_pat + cfg.qsearch_futility_margin;
        }

        let tt_move = tt_hit.map_or(Move::NULL, |hit| hit.mv);
        let recapture_square = match ply {
            0 => None,
            _ => Some(self.stack[ply - 1].current).filter(|mv| !mv.is_null()).map(|mv| mv.to()),
        };
        let mut picker = MovePicker::noisy(pos, tt_move);
        let mut best_move = Move::NULL;
        let mut searched = 0usize;

        while let Some((mv, _)) = picker.pick_next() {
            if !in_check {
                if qply >= cfg.qsearch_recapture_ply && recapture_square != Some(mv.to()) {
                    continue;
                }
                if !mv.is_promotion() {
                    let optimistic = futility_base + victim_value(pos, mv);
                    if optimistic <= alpha {
                        best_score = best_score.max(optimistic);
                        continue;
                    }
                }
                if !see_ge(pos, mv, 0) {
                    continue;
                }
            }
            let Some(child) = pos.apply(mv) else {
                continue;
            };
            searched += 1;
            let played = pos.piece_on(mv.from()).map(|piece| PieceTo { piece, to: mv.to() });
            self.enter(ply, mv, played, &child);
            let score = -self.qsearch(&child, ply + 1, qply + 1, -beta, -alpha, pv_node);
            self.leave();
            if self.stopped {
                return ABORTED;
            }
            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = mv;
                    self.pv.update(ply, mv);
                    if score >= beta {
                        break;
                    }
                    alpha = score;
                }
            }
        }

        if in_check && searched == 0 {
            return mated_in(ply);
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if pv_node && !best_move.is_null() {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt_store(hash, ply, best_move, best_score, static_eval, bound, tt_depth, flags);
        best_score
    }
}
