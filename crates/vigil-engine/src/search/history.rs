//! Per-thread move-ordering memory: killers, butterfly history,
//! counter-move history and counter moves.
//!
//! Tables persist across searches and are aged (halved) rather than cleared.

use vigil_core::{Move, Piece, Square};

use super::MAX_PLY;

/// Histories saturate smoothly towards this magnitude.
pub const HISTORY_MAX: i32 = 16_384;

const BONUS_CAP: i32 = 1_536;

/// Depth-scaled reward for a cutoff move; quiets tried before it get the
/// same magnitude as a malus.
#[inline]
pub fn history_bonus(depth: i32) -> i32 {
    (depth * depth + 2 * depth).min(BONUS_CAP)
}

#[inline]
fn gravity(entry: i32, delta: i32) -> i32 {
    let delta = delta.clamp(-HISTORY_MAX, HISTORY_MAX);
    entry + delta - entry * delta.abs() / HISTORY_MAX
}

/// The move just played, as seen by the next ply's heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceTo {
    pub piece: Piece,
    pub to: Square,
}

impl PieceTo {
    #[inline]
    fn index(self) -> usize {
        self.piece.index() * 64 + self.to.index()
    }
}

pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY + 2],
}

impl KillerTable {
    pub fn new() -> KillerTable {
        KillerTable {
            slots: [[Move::NULL; 2]; MAX_PLY + 2],
        }
    }

    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] != mv {
            slot[1] = slot[0];
            slot[0] = mv;
        }
    }

    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NULL; 2])
    }

    pub fn clear_ply(&mut self, ply: usize) {
        if let Some(slot) = self.slots.get_mut(ply) {
            *slot = [Move::NULL; 2];
        }
    }

    pub fn clear(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY + 2];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Butterfly-style history keyed by moving piece and destination.
pub struct HistoryTable {
    table: [[i32; 64]; Piece::COUNT],
}

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            table: [[0; 64]; Piece::COUNT],
        }
    }

    #[inline]
    pub fn get(&self, key: PieceTo) -> i32 {
        self.table[key.piece.index()][key.to.index()]
    }

    pub fn update(&mut self, key: PieceTo, delta: i32) {
        let entry = &mut self.table[key.piece.index()][key.to.index()];
        *entry = gravity(*entry, delta);
    }

    pub fn age(&mut self) {
        self.table.iter_mut().flatten().for_each(|h| *h /= 2);
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

const PIECE_TO: usize = Piece::COUNT * 64;

/// History of a reply given the previous move, `[prev][current]`.
pub struct ContinuationHistory {
    table: Box<[[i16; PIECE_TO]]>,
}

impl ContinuationHistory {
    pub fn new() -> ContinuationHistory {
        ContinuationHistory {
            table: vec![[0i16; PIECE_TO]; PIECE_TO].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn get(&self, prev: PieceTo, current: PieceTo) -> i32 {
        self.table[prev.index()][current.index()] as i32
    }

    pub fn update(&mut self, prev: PieceTo, current: PieceTo, delta: i32) {
        let entry = &mut self.table[prev.index()][current.index()];
        *entry = gravity(*entry as i32, delta) as i16;
    }

    pub fn age(&mut self) {
        self.table.iter_mut().flatten().for_each(|h| *h /= 2);
    }
}

impl Default for ContinuationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// The quiet reply that last refuted a given previous move.
pub struct CounterMoves {
    table: [[Move; 64]; Piece::COUNT],
}

impl CounterMoves {
    pub fn new() -> CounterMoves {
        CounterMoves {
            table: [[Move::NULL; 64]; Piece::COUNT],
        }
    }

    pub fn get(&self, prev: PieceTo) -> Move {
        self.table[prev.piece.index()][prev.to.index()]
    }

    pub fn set(&mut self, prev: PieceTo, mv: Move) {
        self.table[prev.piece.index()][prev.to.index()] = mv;
    }
}

impl Default for CounterMoves {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a worker remembers about move ordering between searches.
#[derive(Default)]
pub struct Heuristics {
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub continuation: ContinuationHistory,
    pub counters: CounterMoves,
}

impl Heuristics {
    /// Quiet ordering score: butterfly plus continuation on the previous move.
    pub fn quiet_score(&self, current: PieceTo, prev: Option<PieceTo>) -> i32 {
        let butterfly = self.history.get(current);
        match prev {
            Some(prev) => butterfly + self.continuation.get(prev, current),
            None => butterfly,
        }
    }

    /// Reward `best` (a quiet cutoff move) and penalise the quiets tried
    /// before it.
    pub fn reward_quiet(
        &mut self,
        ply: usize,
        depth: i32,
        best: (Move, PieceTo),
        tried: impl IntoIterator<Item = PieceTo>,
        prev: Option<PieceTo>,
    ) {
        let bonus = history_bonus(depth);
        let (mv, key) = best;
        self.killers.store(ply, mv);
        self.history.update(key, bonus);
        if let Some(prev) = prev {
            self.continuation.update(prev, key, bonus);
            self.counters.set(prev, mv);
        }
        for key in tried {
            self.history.update(key, -bonus);
            if let Some(prev) = prev {
                self.continuation.update(prev, key, -bonus);
            }
        }
    }

    /// Halve every history and forget killers ahead of a new search.
    pub fn age(&mut self) {
        self.killers.clear();
        self.history.age();
        self.continuation.age();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{Color, MoveKind, PieceKind};

    fn key(kind: PieceKind, to: Square) -> PieceTo {
        PieceTo { piece: Piece::new(kind, Color::White), to }
    }

    #[test]
    fn killers_shift_and_ignore_duplicates() {
        let mut kt = KillerTable::new();
        let a = Move::new(Square::E2, Square::E4, MoveKind::Quiet);
        let b = Move::new(Square::D2, Square::D4, MoveKind::Quiet);
        kt.store(5, a);
        kt.store(5, a);
        assert_eq!(kt.get(5), [a, Move::NULL]);
        kt.store(5, b);
        assert_eq!(kt.get(5), [b, a]);
        kt.clear_ply(5);
        assert_eq!(kt.get(5), [Move::NULL; 2]);
        kt.store(MAX_PLY + 50, a);
        assert_eq!(kt.get(MAX_PLY + 50), [Move::NULL; 2]);
    }

    #[test]
    fn gravity_keeps_history_bounded() {
        let mut h = HistoryTable::new();
        let k = key(PieceKind::Knight, Square::F3);
        for _ in 0..1000 {
            h.update(k, history_bonus(20));
        }
        assert!(h.get(k) <= HISTORY_MAX);
        assert!(h.get(k) > HISTORY_MAX / 2);
        for _ in 0..1000 {
            h.update(k, -history_bonus(20));
        }
        assert!(h.get(k) >= -HISTORY_MAX);
        assert!(h.get(k) < 0);
    }

    #[test]
    fn aging_halves_instead_of_clearing() {
        let mut heur = Heuristics::default();
        let k = key(PieceKind::Pawn, Square::E4);
        let prev = PieceTo { piece: Piece::new(PieceKind::Knight, Color::Black), to: Square::F6 };
        heur.history.update(k, 1000);
        heur.continuation.update(prev, k, 1000);
        let before = (heur.history.get(k), heur.continuation.get(prev, k));
        heur.age();
        assert_eq!(heur.history.get(k), before.0 / 2);
        assert_eq!(heur.continuation.get(prev, k), before.1 / 2);
    }

    #[test]
    fn reward_updates_every_table() {
        let mut heur = Heuristics::default();
        let best = Move::new(Square::G1, Square::F3, MoveKind::Quiet);
        let best_key = key(PieceKind::Knight, Square::F3);
        let worse_key = key(PieceKind::Knight, Square::C3);
        let prev = PieceTo { piece: Piece::new(PieceKind::Pawn, Color::Black), to: Square::E5 };

        heur.reward_quiet(3, 4, (best, best_key), [worse_key], Some(prev));

        assert_eq!(heur.killers.get(3)[0], best);
        assert_eq!(heur.counters.get(prev), best);
        assert!(heur.history.get(best_key) > 0);
        assert_eq!(heur.history.get(worse_key), -heur.history.get(best_key));
        assert!(heur.quiet_score(best_key, Some(prev)) > heur.history.get(best_key));
        assert!(heur.quiet_score(worse_key, Some(prev)) < 0);
    }
}
