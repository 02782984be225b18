//! Errors raised while building a position from an external description.

use thiserror::Error;

/// Structural problems with a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: &'static str, count: u32 },

    #[error("pawns on the first or last rank")]
    PawnsOnBackRank,

    #[error("the side not to move is in check")]
    OpponentInCheck,

    #[error("castling right {0} has no king or rook on its home square")]
    BadCastlingRight(char),
}

/// Errors returned by FEN parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 4 to 6 fields, found {0}")]
    FieldCount(usize),

    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),

    #[error("rank {rank} describes {squares} squares")]
    RankLength { rank: usize, squares: usize },

    #[error("invalid piece character {0:?}")]
    InvalidPiece(char),

    #[error("invalid side to move {0:?}")]
    InvalidSide(String),

    #[error("invalid castling character {0:?}")]
    InvalidCastling(char),

    #[error("invalid square {0:?}")]
    InvalidSquare(String),

    #[error("invalid {field} {value:?}")]
    InvalidCounter { field: &'static str, value: String },

    #[error(transparent)]
    Position(#[from] PositionError),
}
