//! The position: bitboards, mailbox, game state and incrementally kept hashes.

use std::fmt;

use crate::attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use crate::bitboard::Bitboard;
use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::error::PositionError;
use crate::movegen::{self, phase};
use crate::moves::Move;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// A complete game state. `Copy`, so search and perft make a fresh child
/// per move and never undo anything.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub(crate) pieces: [Bitboard; PieceKind::COUNT],
    pub(crate) sides: [Bitboard; Color::COUNT],
    pub(crate) occupied: Bitboard,
    pub(crate) mailbox: [Option<Piece>; Square::COUNT],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
    pub(crate) pawn_hash: u64,
    pub(crate) kings: [Square; Color::COUNT],
    pub(crate) checkers: Bitboard,
}

impl Position {
    /// An empty board with White to move; only used while building.
    pub(crate) const fn empty() -> Position {
        Position {
            pieces: [Bitboard::EMPTY; PieceKind::COUNT],
            sides: [Bitboard::EMPTY; Color::COUNT],
            occupied: Bitboard::EMPTY,
            mailbox: [None; Square::COUNT],
            side_to_move: Color::White,
            castling: CastleRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            pawn_hash: 0,
            kings: [Square::E1, Square::E8],
            checkers: Bitboard::EMPTY,
        }
    }

    /// The standard initial position.
    pub fn startpos() -> Position {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut pos = Position::empty();
        for (sq, kind) in Bitboard::RANK_1.zip(BACK_RANK) {
            pos.put_piece(Piece::new(kind, Color::White), sq);
            pos.put_piece(Piece::new(kind, Color::Black), sq.flip_rank());
        }
        for sq in Bitboard::rank(1) {
            pos.put_piece(Piece::new(PieceKind::Pawn, Color::White), sq);
            pos.put_piece(Piece::new(PieceKind::Pawn, Color::Black), sq.flip_rank());
        }
        pos.set_castling(CastleRights::ALL);
        pos.refresh_derived();
        pos
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Full Zobrist key.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Zobrist key over pawns only, for pawn-structure caches.
    #[inline]
    pub fn pawn_hash(&self) -> u64 {
        self.pawn_hash
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    #[inline]
    pub fn pieces_of(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.pieces[kind.index()] & self.sides[color.index()]
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Enemy pieces giving check to the side to move.
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.checkers
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers.any()
    }

    /// Number of pieces on the board, kings and pawns included.
    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.occupied.count()
    }

    /// Pieces of both colors attacking `sq`, with sliders seeing through `occupied`.
    pub fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let bishops = self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen);
        let rooks = self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen);
        (pawn_attacks(Color::White, sq) & self.pieces_of(PieceKind::Pawn, Color::Black))
            | (pawn_attacks(Color::Black, sq) & self.pieces_of(PieceKind::Pawn, Color::White))
            | (knight_attacks(sq) & self.pieces(PieceKind::Knight))
            | (king_attacks(sq) & self.pieces(PieceKind::King))
            | (bishop_attacks(sq, occupied) & bishops)
            | (rook_attacks(sq, occupied) & rooks)
    }

    /// Whether any piece of `by` attacks `sq` on the current board.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_attacked_with(sq, by, self.occupied)
    }

    pub(crate) fn is_attacked_with(&self, sq: Square, by: Color, occupied: Bitboard) -> bool {
        let them = self.side(by);
        if (pawn_attacks(!by, sq) & self.pieces(PieceKind::Pawn) & them).any()
            || (knight_attacks(sq) & self.pieces(PieceKind::Knight) & them).any()
            || (king_attacks(sq) & self.pieces(PieceKind::King) & them).any()
        {
            return true;
        }
        let queens = self.pieces(PieceKind::Queen);
        (bishop_attacks(sq, occupied) & (self.pieces(PieceKind::Bishop) | queens) & them).any()
            || (rook_attacks(sq, occupied) & (self.pieces(PieceKind::Rook) | queens) & them).any()
    }

    /// Whether `color` has anything besides king and pawns.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let kp = self.pieces(PieceKind::Pawn) | self.pieces(PieceKind::King);
        (self.side(color) & !kp).any()
    }

    /// Dead positions: no side can ever deliver mate.
    ///
    /// Covers bare kings, a single minor piece, and bishops that all stand on
    /// squares of one color.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.pieces(PieceKind::Pawn)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen);
        if heavy.any() {
            return false;
        }
        let knights = self.pieces(PieceKind::Knight);
        let bishops = self.pieces(PieceKind::Bishop);
        let minors = (knights | bishops).count();
        if minors <= 1 {
            return true;
        }
        knights.is_empty()
            && ((bishops & Bitboard::DARK_SQUARES).is_empty()
                || (bishops & !Bitboard::DARK_SQUARES).is_empty())
    }

    /// Recompute `(hash, pawn_hash)` without using the incremental fields.
    pub fn hashes_from_scratch(&self) -> (u64, u64) {
        let mut hash = 0u64;
        let mut pawn_hash = 0u64;
        for sq in self.occupied {
            if let Some(piece) = self.piece_on(sq) {
                let key = zobrist::piece_square(piece, sq);
                hash ^= key;
                if piece.kind() == PieceKind::Pawn {
                    pawn_hash ^= key;
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= zobrist::black_to_move();
        }
        hash ^= zobrist::castling(self.castling);
        if let Some(ep) = self.en_passant {
            hash ^= zobrist::en_passant_file(ep.file());
        }
        (hash, pawn_hash)
    }

    /// Resolve coordinate notation against the legal moves of this position.
    pub fn parse_move(&self, text: &str) -> Option<Move> {
        movegen::generate::<phase::All>(self)
            .iter()
            .find(|mv| mv.to_uci() == text)
            .filter(|&mv| self.apply(mv).is_some())
    }

    /// Whether `mv` is one of the moves the generator would produce here.
    ///
    /// Used to vet moves from shared tables, which may be stale or belong to a
    /// colliding position.
    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_null() {
            return false;
        }
        match self.piece_on(mv.from()) {
            Some(p) if p.color() == self.side_to_move => {}
            _ => return false,
        }
        movegen::generate::<phase::Evasions>(self).contains(mv)
    }

    /// Check structural sanity: one king each, no pawns on the back ranks,
    /// the side not to move is not in check, castling rights match the board.
    pub fn validate(&self) -> Result<(), PositionError> {
        for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
            let count = self.pieces_of(PieceKind::King, color).count();
            if count != 1 {
                return Err(PositionError::KingCount { color: name, count });
            }
        }
        if (self.pieces(PieceKind::Pawn) & (Bitboard::RANK_1 | Bitboard::RANK_8)).any() {
            return Err(PositionError::PawnsOnBackRank);
        }
        let them = !self.side_to_move;
        if self.is_attacked(self.king_square(them), self.side_to_move) {
            return Err(PositionError::OpponentInCheck);
        }
        let white_king = Piece::new(PieceKind::King, Color::White);
        let black_king = Piece::new(PieceKind::King, Color::Black);
        let white_rook = Piece::new(PieceKind::Rook, Color::White);
        let black_rook = Piece::new(PieceKind::Rook, Color::Black);
        for (right, king, king_sq, rook, rook_sq, c) in [
            (CastleRights::WHITE_SHORT, white_king, Square::E1, white_rook, Square::H1, 'K'),
            (CastleRights::WHITE_LONG, white_king, Square::E1, white_rook, Square::A1, 'Q'),
            (CastleRights::BLACK_SHORT, black_king, Square::E8, black_rook, Square::H8, 'k'),
            (CastleRights::BLACK_LONG, black_king, Square::E8, black_rook, Square::A8, 'q'),
        ] {
            if self.castling.contains(right)
                && (self.piece_on(king_sq) != Some(king) || self.piece_on(rook_sq) != Some(rook))
            {
                return Err(PositionError::BadCastlingRight(c));
            }
        }
        Ok(())
    }

    /// A human-readable board diagram.
    pub fn pretty(&self) -> PrettyPosition<'_> {
        PrettyPosition(self)
    }

    // --- incremental editing, shared by the builders and `apply` ---

    #[inline]
    pub(crate) fn put_piece(&mut self, piece: Piece, sq: Square) {
        let bb = sq.bitboard();
        self.pieces[piece.kind().index()] |= bb;
        self.sides[piece.color().index()] |= bb;
        self.occupied |= bb;
        self.mailbox[sq.index()] = Some(piece);
        let key = zobrist::piece_square(piece, sq);
        self.hash ^= key;
        match piece.kind() {
            PieceKind::Pawn => self.pawn_hash ^= key,
            PieceKind::King => self.kings[piece.color().index()] = sq,
            _ => {}
        }
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.mailbox[sq.index()].take()?;
        let bb = sq.bitboard();
        self.pieces[piece.kind().index()] ^= bb;
        self.sides[piece.color().index()] ^= bb;
        self.occupied ^= bb;
        let key = zobrist::piece_square(piece, sq);
        self.hash ^= key;
        if piece.kind() == PieceKind::Pawn {
            self.pawn_hash ^= key;
        }
        Some(piece)
    }

    #[inline]
    pub(crate) fn move_piece(&mut self, from: Square, to: Square) {
        if let Some(piece) = self.remove_piece(from) {
            self.put_piece(piece, to);
        }
    }

    #[inline]
    pub(crate) fn set_castling(&mut self, rights: CastleRights) {
        self.hash ^= zobrist::castling(self.castling) ^ zobrist::castling(rights);
        self.castling = rights;
    }

    #[inline]
    pub(crate) fn set_en_passant(&mut self, sq: Option<Square>) {
        if let Some(old) = self.en_passant {
            self.hash ^= zobrist::en_passant_file(old.file());
        }
        if let Some(new) = sq {
            self.hash ^= zobrist::en_passant_file(new.file());
        }
        self.en_passant = sq;
    }

    #[inline]
    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        if color != self.side_to_move {
            self.hash ^= zobrist::black_to_move();
            self.side_to_move = color;
        }
    }

    /// Whether a pawn of the side to move could capture onto `ep`.
    #[inline]
    pub(crate) fn en_passant_usable(&self, ep: Square) -> bool {
        let us = self.side_to_move;
        (pawn_attacks(!us, ep) & self.pieces_of(PieceKind::Pawn, us)).any()
    }

    /// Recompute the checkers of the side to move.
    #[inline]
    pub(crate) fn refresh_derived(&mut self) {
        let us = self.side_to_move;
        self.checkers =
            self.attackers_to(self.king_square(us), self.occupied) & self.side(!us);
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::startpos()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position(\"{self}\")")
    }
}

/// Board diagram returned by [`Position::pretty`].
pub struct PrettyPosition<'a>(&'a Position);

impl fmt::Display for PrettyPosition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.0;
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = Square::from_coords(file, rank)
                    .and_then(|sq| pos.piece_on(sq))
                    .map_or('.', Piece::fen_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f, "fen:  {pos}")?;
        write!(f, "hash: {:016x}", pos.hash)
    }
}
