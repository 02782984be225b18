//! Principal variation search.

use vigil_core::{Move, Position};

use crate::external::Wdl;

use super::history::PieceTo;
use super::ordering::{MovePicker, OrderingContext, is_good_noisy, lmr_reduction};
use super::see::see_ge;
use super::tt::{Bound, DEPTH_EVAL_ONLY, TtFlags};
use super::{ABORTED, DRAW, INF, MAX_PLY, Searcher, TB_WIN, TB_WIN_THRESHOLD, mate_in, mated_in};

/// Quiets remembered per node for the history malus.
const MAX_QUIETS: usize = 64;

impl Searcher<'_> {
    /// Fail-soft alpha-beta with a null window for every move after the
    /// first. `cut_node` marks nodes expected to fail high.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn pvs(
        &mut self,
        pos: &Position,
        depth: i32,
        ply: usize,
        mut alpha: i32,
        mut beta: i32,
        pv_node: bool,
        cut_node: bool,
    ) -> i32 {
        self.pv.clear(ply);
        if depth <= 0 {
            return self.qsearch(pos, ply, 0, alpha, beta, pv_node);
        }
        if self.poll() {
            return ABORTED;
        }
        self.seldepth = self.seldepth.max(ply + 1);

        let cfg = self.ctx.config;
        let root = ply == 0;
        let in_check = pos.in_check();

        if !root {
            if self.is_draw(pos, ply) {
                return DRAW;
            }
            if ply >= MAX_PLY {
                return if in_check { DRAW } else { self.evaluate(pos) };
            }
            alpha = alpha.max(mated_in(ply));
            beta = beta.min(mate_in(ply + 1));
            if alpha >= beta {
                return alpha;
            }
        }

        let excluded = self.stack[ply].excluded;
        let hash = pos.hash();
        let flags = TtFlags { pv: pv_node, in_check };
        let tt_hit = if excluded.is_null() { self.tt_probe(hash, ply) } else { None };
        let mut tt_move = tt_hit.map_or(Move::NULL, |hit| hit.mv);

        if let Some(hit) = tt_hit
            && !pv_node
            && hit.depth >= depth
            && pos.halfmove_clock() < cfg.tt_max_halfmove
            && hit.bound.cuts(hit.score, alpha, beta)
        {
            if hit.score >= beta && hit.mv.is_quiet() && !hit.mv.is_null() {
                self.data.heuristics.killers.store(ply, hit.mv);
            }
            return hit.score;
        }

        if !root
            && excluded.is_null()
            && depth >= cfg.tb_probe_depth
            && pos.piece_count() <= self.ctx.tablebase.max_pieces()
            && pos.castling().is_empty()
            && let Some(wdl) = self.ctx.tablebase.probe_wdl(pos)
        {
            let (score, bound) = match wdl {
                Wdl::Win => (TB_WIN - ply as i32, Bound::Lower),
                Wdl::Loss => (-TB_WIN + ply as i32, Bound::Upper),
                Wdl::CursedWin => (DRAW + 1, Bound::Exact),
                Wdl::BlessedLoss => (DRAW - 1, Bound::Exact),
                Wdl::Draw => (DRAW, Bound::Exact),
            };
            if bound.cuts(score, alpha, beta) {
                let depth = (depth + 6).min(MAX_PLY as i32);
                self.tt_store(hash, ply, Move::NULL, score, None, bound, depth, flags);
                return score;
            }
        }

        // Static evaluation, refined by a TT bound when one is tighter.
        let mut static_eval = None;
        let mut eval = -INF;
        if !in_check {
            let raw = if !excluded.is_null() {
                self.stack[ply].static_eval
            } else {
                tt_hit.and_then(|hit| hit.eval)
            };
            let raw = match raw {
                Some(e) => e,
                None => {
                    let e = self.evaluate(pos);
                    if excluded.is_null() {
                        self.tt_store(
                            hash,
                            ply,
                            Move::NULL,
                            0,
                            Some(e),
                            Bound::None,
                            DEPTH_EVAL_ONLY,
                            flags,
                        );
                    }
                    e
                }
            };
            static_eval = Some(raw);
            eval = raw;
            if let Some(hit) = tt_hit {
                let tighter = match hit.bound {
                    Bound::Exact => true,
                    Bound::Lower => hit.score > raw,
                    Bound::Upper => hit.score < raw,
                    Bound::None => false,
                };
                if tighter {
                    eval = hit.score;
                }
            }
        }
        self.stack[ply].static_eval = static_eval;

        let improving = match static_eval {
            Some(se) => {
                let earlier = match ply {
                    0 | 1 => None,
                    2 | 3 => self.stack[ply - 2].static_eval,
                    _ => self.stack[ply - 2].static_eval.or(self.stack[ply - 4].static_eval),
                };
                earlier.is_none_or(|e| se > e)
            }
            None => false,
        };

        self.data.heuristics.killers.clear_ply(ply + 2);
        self.stack[ply].threat = None;
        self.stack[ply + 1].excluded = Move::NULL;

        let us = pos.side_to_move();
        if !pv_node
            && !in_check
            && !cfg.mate_finder
            && excluded.is_null()
            && let Some(se) = static_eval
        {
            // Reverse futility.
            if depth <= cfg.static_null_max_depth
                && eval.abs() < TB_WIN_THRESHOLD
                && eval - cfg.static_null_margin * (depth - i32::from(improving)) >= beta
            {
                return eval;
            }

            // Razoring: hopeless shallow nodes only get a quiescence test.
            if depth <= cfg.razor_max_depth && eval + cfg.razor_margin * depth <= alpha {
                let score = self.qsearch(pos, ply, 0, alpha, alpha + 1, false);
                if self.stopped {
                    return ABORTED;
                }
                if score <= alpha {
                    return score;
                }
            }

            // Null move.
            if depth >= cfg.null_move_min_depth
                && eval >= beta
                && !root
                && ply >= self.nmp_min_ply
                && !self.stack[ply - 1].current.is_null()
                && beta.abs() < TB_WIN_THRESHOLD
            {
                let r = depth / 4 + 3 + ((eval - beta) / cfg.null_move_divisor).min(5);
                let null_depth = depth - r;
                let child = pos.apply_null();
                self.enter(ply, Move::NULL, None, &child);
                let score =
                    -self.pvs(&child, null_depth, ply + 1, -beta, -beta + 1, false, !cut_node);
                self.leave();
                if self.stopped {
                    return ABORTED;
                }
                if score >= beta {
                    let score = if score >= TB_WIN_THRESHOLD { beta } else { score };
                    let verify =
                        !pos.has_non_pawn_material(us) || depth >= cfg.null_move_verify_depth;
                    if !verify {
                        return score;
                    }
                    // Zugzwang check: search this node again without passing.
                    let saved = self.nmp_min_ply;
                    self.nmp_min_ply = ply + (3 * null_depth.max(0) / 4) as usize + 1;
                    let verified = self.pvs(pos, null_depth, ply, beta - 1, beta, false, false);
                    self.nmp_min_ply = saved;
                    if self.stopped {
                        return ABORTED;
                    }
                    if verified >= beta {
                        return score;
                    }
                } else {
                    self.stack[ply].threat = self.pv.line(ply + 1).first().map(|mv| mv.to());
                }
            }

            // ProbCut: a good capture that beats beta by a margin in a
            // reduced search almost surely beats it at full depth.
            if depth >= cfg.probcut_min_depth && beta.abs() < TB_WIN_THRESHOLD {
                let pc_beta = beta + cfg.probcut_margin;
                let refuted =
                    tt_hit.is_some_and(|hit| hit.depth >= depth - 3 && hit.score < pc_beta);
                if !refuted {
                    let noisy_tt = if tt_move.is_noisy() { tt_move } else { Move::NULL };
                    let mut picker = MovePicker::noisy(pos, noisy_tt);
                    while let Some((mv, _)) = picker.pick_next() {
                        if !see_ge(pos, mv, pc_beta - se) {
                            continue;
                        }
                        let Some(child) = pos.apply(mv) else {
                            continue;
                        };
                        let played =
                            pos.piece_on(mv.from()).map(|piece| PieceTo { piece, to: mv.to() });
                        self.enter(ply, mv, played, &child);
                        let (child_alpha, child_beta) = (-pc_beta, -pc_beta + 1);
                        let mut score =
                            -self.qsearch(&child, ply + 1, 0, child_alpha, child_beta, false);
                        if !self.stopped && score >= pc_beta {
                            score = -self.pvs(
                                &child,
                                depth - 4,
                                ply + 1,
                                child_alpha,
                                child_beta,
                                false,
                                !cut_node,
                            );
                        }
                        self.leave();
                        if self.stopped {
                            return ABORTED;
                        }
                        if score >= pc_beta {
                            self.tt_store(
                                hash,
                                ply,
                                mv,
                                score,
                                static_eval,
                                Bound::Lower,
                                depth - 3,
                                flags,
                            );
                            return score;
                        }
                    }
                }
            }
        }

        // No move to try first: find one with a shallower search at PV
        // nodes, or just search less elsewhere.
        let mut depth = depth;
        if tt_move.is_null() && excluded.is_null() && depth >= cfg.iid_min_depth {
            if pv_node {
                let _ = self.pvs(pos, depth / 2, ply, alpha, beta, true, false);
                if self.stopped {
                    return ABORTED;
                }
                tt_move = self.pv.line(ply).first().copied().unwrap_or(Move::NULL);
                self.pv.clear(ply);
            } else if cut_node {
                depth -= 1;
            }
        }

        let prev = if root { None } else { self.stack[ply - 1].played };
        let mut picker = {
            let heuristics = &self.data.heuristics;
            let ctx = OrderingContext {
                heuristics,
                killers: heuristics.killers.get(ply),
                counter: prev.map_or(Move::NULL, |p| heuristics.counters.get(p)),
                prev,
                threat: self.stack[ply].threat,
            };
            MovePicker::new(pos, tt_move, &ctx)
        };

        let lmp_limit = ((3 + depth * depth) / if improving { 1 } else { 2 }) as usize;
        let mut best_score = -INF;
        let mut best_move = Move::NULL;
        let mut moves_searched = 0usize;
        let mut quiets = [Move::NULL; MAX_QUIETS];
        let mut quiet_count = 0;

        while let Some((mv, order_score)) = picker.pick_next() {
            if mv == excluded {
                continue;
            }
            let quiet = mv.is_quiet();
            let Some(piece) = pos.piece_on(mv.from()) else {
                continue;
            };
            let key = PieceTo { piece, to: mv.to() };

            let Some(child) = pos.apply(mv) else {
                continue;
            };
            let gives_check = child.in_check();

            // Shallow pruning once a real score is on the board. Quiet checks
            // are always searched.
            if !root
                && !pv_node
                && !in_check
                && !cfg.mate_finder
                && best_score > -TB_WIN_THRESHOLD
            {
                if quiet {
                    if !gives_check {
                        if depth <= cfg.lmp_max_depth && moves_searched >= lmp_limit {
                            continue;
                        }
                        let lmr_depth =
                            (depth - 1 - lmr_reduction(depth, moves_searched + 1)).max(0);
                        if let Some(se) = static_eval
                            && lmr_depth <= cfg.futility_max_depth
                            && se + cfg.futility_margin * (lmr_depth + 1) <= alpha
                        {
                            continue;
                        }
                    }
                } else if depth <= cfg.see_prune_max_depth
                    && !see_ge(pos, mv, -cfg.see_capture_margin * depth)
                {
                    continue;
                }
            }
            moves_searched += 1;

            let mut extension = 0;
            if !root
                && mv == tt_move
                && excluded.is_null()
                && depth >= cfg.singular_min_depth
                && let Some(hit) = tt_hit
                && matches!(hit.bound, Bound::Lower | Bound::Exact)
                && hit.depth >= depth - 3
                && hit.score.abs() < TB_WIN_THRESHOLD
            {
                let s_beta = hit.score - 2 * depth;
                let s_depth = (depth - 1) / 2;
                self.stack[ply].excluded = mv;
                let score = self.pvs(pos, s_depth, ply, s_beta - 1, s_beta, false, cut_node);
                self.stack[ply].excluded = Move::NULL;
                if self.stopped {
                    return ABORTED;
                }
                if score < s_beta {
                    extension = 1;
                    if !pv_node
                        && score < s_beta - cfg.double_extension_margin
                        && self.stack[ply].double_extensions < cfg.max_double_extensions
                    {
                        extension = 2;
                    }
                } else if s_beta >= beta {
                    // Multi-cut: more than one move beats beta.
                    return s_beta;
                } else if hit.score >= beta {
                    extension = -1;
                }
            } else if gives_check {
                extension = 1;
            } else if pv_node
                && mv.is_capture()
                && !root
                && self.stack[ply - 1].current.is_capture()
                && self.stack[ply - 1].current.to() == mv.to()
            {
                extension = 1;
            }
            if ply as i32 >= 2 * self.root_depth {
                extension = extension.min(0);
            }
            let new_depth = depth - 1 + extension;

            self.stack[ply + 1].double_extensions =
                self.stack[ply].double_extensions + u8::from(extension == 2);
            self.enter(ply, mv, Some(key), &child);

            let mut score;
            if moves_searched == 1 {
                let child_cut = !pv_node && !cut_node;
                score = -self.pvs(&child, new_depth, ply + 1, -beta, -alpha, pv_node, child_cut);
            } else {
                let mut reduction = 0;
                if depth >= cfg.lmr_min_depth
                    && moves_searched > 1 + usize::from(pv_node)
                    && (quiet || !is_good_noisy(order_score))
                {
                    reduction = lmr_reduction(depth, moves_searched);
                    reduction += i32::from(!improving);
                    reduction += i32::from(tt_move.is_noisy());
                    reduction -= i32::from(pv_node);
                    reduction += i32::from(cut_node);
                    reduction -= i32::from(gives_check);
                    if quiet {
                        reduction -= self.data.heuristics.quiet_score(key, prev) / 8192;
                    }
                    reduction = reduction.clamp(0, (new_depth - 1).max(0));
                }
                let reduced = new_depth - reduction;
                score = -self.pvs(&child, reduced, ply + 1, -alpha - 1, -alpha, false, true);
                if !self.stopped && score > alpha && reduction > 0 {
                    score =
                        -self.pvs(&child, new_depth, ply + 1, -alpha - 1, -alpha, false, !cut_node);
                }
                if !self.stopped && pv_node && score > alpha && score < beta {
                    score = -self.pvs(&child, new_depth, ply + 1, -beta, -alpha, true, false);
                }
            }
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
                        if quiet {
                            let tried = quiets[..quiet_count].iter().filter_map(|q| {
                                pos.piece_on(q.from()).map(|piece| PieceTo { piece, to: q.to() })
                            });
                            self.data.heuristics.reward_quiet(ply, depth, (mv, key), tried, prev);
                        }
                        break;
                    }
                    alpha = score;
                }
            }
            if quiet && mv != best_move && quiet_count < MAX_QUIETS {
                quiets[quiet_count] = mv;
                quiet_count += 1;
            }
        }

        if moves_searched == 0 {
            return if !excluded.is_null() {
                alpha
            } else if in_check {
                mated_in(ply)
            } else {
                DRAW
            };
        }

        if excluded.is_null() {
            let bound = if best_score >= beta {
                Bound::Lower
            } else if pv_node && !best_move.is_null() {
                Bound::Exact
            } else {
                Bound::Upper
            };
            self.tt_store(hash, ply, best_move, best_score, static_eval, bound, depth, flags);
        }
        best_score
    }
}
