//! Seams for endgame tablebases and opening books.

use std::collections::HashMap;

use vigil_core::{Move, Position};

/// Win/draw/loss from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wdl {
    Loss,
    /// Lost, but saved by the fifty-move rule.
    BlessedLoss,
    Draw,
    /// Won, but spoiled by the fifty-move rule.
    CursedWin,
    Win,
}

pub trait Tablebase: Send + Sync {
    /// Largest piece count (kings included) the tables cover.
    fn max_pieces(&self) -> u32;

    fn probe_wdl(&self, pos: &Position) -> Option<Wdl>;

    /// Best root move and its distance to zeroing.
    fn probe_root(&self, pos: &Position) -> Option<(Move, u32)>;
}

/// Tablebase that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTablebase;

impl Tablebase for NoTablebase {
    fn max_pieces(&self) -> u32 {
        0
    }

    fn probe_wdl(&self, _pos: &Position) -> Option<Wdl> {
        None
    }

    fn probe_root(&self, _pos: &Position) -> Option<(Move, u32)> {
        None
    }
}

pub trait OpeningBook: Send + Sync {
    fn lookup(&self, hash: u64) -> Option<Move>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn lookup(&self, _hash: u64) -> Option<Move> {
        None
    }
}

/// Book held in memory, keyed by position hash.
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    moves: HashMap<u64, Move>,
}

impl MemoryBook {
    pub fn new() -> MemoryBook {
        MemoryBook::default()
    }

    /// Record `mv` for `pos`; the move must be legal there.
    pub fn insert(&mut self, pos: &Position, mv: Move) -> bool {
        if !pos.is_pseudo_legal(mv) || pos.apply(mv).is_none() {
            return false;
        }
        self.moves.insert(pos.hash(), mv);
        true
    }

    /// Build from `(fen, uci)` pairs, skipping entries that do not parse.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = (&'a str, &'a str)>) -> MemoryBook {
        let mut book = MemoryBook::new();
        for (fen, uci) in lines {
            let Ok(pos) = fen.parse::<Position>() else { continue };
            if let Some(mv) = pos.parse_move(uci) {
                book.insert(&pos, mv);
            }
        }
        book
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl OpeningBook for MemoryBook {
    fn lookup(&self, hash: u64) -> Option<Move> {
        self.moves.get(&hash).copied()
    }
}
