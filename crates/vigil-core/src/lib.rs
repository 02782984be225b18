//! Position representation, pseudo-legal move generation and copy-make move
//! application for the vigil search engine.

mod apply;
mod attacks;
mod bitboard;
mod castle_rights;
mod color;
mod error;
mod fen;
mod movegen;
mod moves;
mod perft;
mod piece;
mod position;
mod square;
mod zobrist;

pub use attacks::{
    between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks, piece_attacks,
    queen_attacks, rook_attacks,
};
pub use bitboard::Bitboard;
pub use castle_rights::CastleRights;
pub use color::Color;
pub use error::{FenError, PositionError};
pub use fen::STARTING_FEN;
pub use movegen::{GenPhase, MAX_MOVES, MoveList, generate, generate_into, phase};
pub use moves::{Move, MoveKind};
pub use perft::{divide, perft};
pub use piece::{Piece, PieceKind};
pub use position::{Position, PrettyPosition};
pub use square::Square;
