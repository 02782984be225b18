//! Pseudo-legal move generation, split into phases chosen at compile time.
//!
//! Only castling is checked for legality here; every other move may still
//! leave the king attacked and is filtered by [`Position::apply`].

mod king;
mod pawns;
mod pieces;

use crate::attacks::between;
use crate::bitboard::Bitboard;
use crate::moves::Move;
use crate::position::Position;

/// Upper bound on moves in any reachable position (the known maximum is 218).
pub const MAX_MOVES: usize = 256;

/// Which slice of the move set a generator call produces.
pub trait GenPhase {
    /// Captures, en passant and every promotion.
    const NOISY: bool;
    /// Non-capturing, non-promoting moves, castling included.
    const QUIET: bool;
    /// Restrict to check evasions when the side to move is in check.
    const EVASIONS: bool;
}

/// Zero-sized phase markers for [`generate`].
pub mod phase {
    use super::GenPhase;

    /// Every pseudo-legal move.
    pub struct All;
    /// Captures plus all promotions.
    pub struct Captures;
    /// Everything that is not in [`Captures`].
    pub struct Quiets;
    /// Replies to check; the same as [`All`] when not in check.
    pub struct Evasions;

    impl GenPhase for All {
        const NOISY: bool = true;
        const QUIET: bool = true;
        const EVASIONS: bool = false;
    }

    impl GenPhase for Captures {
        const NOISY: bool = true;
        const QUIET: bool = false;
        const EVASIONS: bool = false;
    }

    impl GenPhase for Quiets {
        const NOISY: bool = false;
        const QUIET: bool = true;
        const EVASIONS: bool = false;
    }

    impl GenPhase for Evasions {
        const NOISY: bool = true;
        const QUIET: bool = true;
        const EVASIONS: bool = true;
    }
}

/// Fixed-capacity move buffer. Each move carries an ordering score in a
/// parallel array; the score never enters the move itself.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    scores: [i32; MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList {
            moves: [Move::NULL; MAX_MOVES],
            scores: [0; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.scores[self.len] = 0;
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.as_slice().iter().copied()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Move> {
        self.as_slice().get(index).copied()
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    #[inline]
    pub fn score(&self, index: usize) -> i32 {
        self.scores[index]
    }

    #[inline]
    pub fn set_score(&mut self, index: usize, score: i32) {
        self.scores[index] = score;
    }

    /// Swap two entries together with their scores.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.moves.swap(a, b);
        self.scores.swap(a, b);
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for MoveList {
    fn default() -> MoveList {
        MoveList::new()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = Move;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter().copied()
    }
}

/// Destination filters for one generator call.
#[derive(Clone, Copy)]
pub(crate) struct Targets {
    /// Squares captures may land on.
    pub(crate) capture: Bitboard,
    /// Empty squares quiet moves may land on.
    pub(crate) quiet: Bitboard,
    pub(crate) noisy: bool,
    pub(crate) quiets: bool,
}

/// Generate the moves of phase `P` for the side to move.
pub fn generate<P: GenPhase>(pos: &Position) -> MoveList {
    let mut list = MoveList::new();
    generate_into::<P>(pos, &mut list);
    list
}

/// Append the moves of phase `P` to `list`.
pub fn generate_into<P: GenPhase>(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let enemies = pos.side(!us);
    let empty = !pos.occupied();

    if P::EVASIONS && pos.in_check() {
        king::evasions(pos, list);
        let checkers = pos.checkers();
        if checkers.more_than_one() {
            return;
        }
        let Some(checker) = checkers.lsb() else {
            return;
        };
        let block = between(pos.king_square(us), checker);
        let targets = Targets {
            capture: checker.bitboard(),
            quiet: block,
            noisy: true,
            quiets: true,
        };
        pawns::generate(pos, targets, list);
        pieces::generate(pos, targets, list);
        return;
    }

    let targets = Targets {
        capture: if P::NOISY { enemies } else { Bitboard::EMPTY },
        quiet: if P::QUIET { empty } else { Bitboard::EMPTY },
        noisy: P::NOISY,
        quiets: P::QUIET,
    };
    pawns::generate(pos, targets, list);
    pieces::generate(pos, targets, list);
    king::generate(pos, targets, list);
    if P::QUIET && !pos.in_check() {
        king::castling(pos, list);
    }
}
