//! Compact 16-bit move encoding.

use std::fmt;

use crate::piece::PieceKind;
use crate::square::Square;

/// What a move does besides moving a piece from one square to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    Quiet = 0,
    Capture = 1,
    EnPassant = 2,
    PromoKnight = 3,
    PromoBishop = 4,
    PromoRook = 5,
    PromoQueen = 6,
    PromoCaptureKnight = 7,
    PromoCaptureBishop = 8,
    PromoCaptureRook = 9,
    PromoCaptureQueen = 10,
    CastleWhiteShort = 11,
    CastleWhiteLong = 12,
    CastleBlackShort = 13,
    CastleBlackLong = 14,
}

impl MoveKind {
    const ALL: [MoveKind; 15] = [
        MoveKind::Quiet,
        MoveKind::Capture,
        MoveKind::EnPassant,
        MoveKind::PromoKnight,
        MoveKind::PromoBishop,
        MoveKind::PromoRook,
        MoveKind::PromoQueen,
        MoveKind::PromoCaptureKnight,
        MoveKind::PromoCaptureBishop,
        MoveKind::PromoCaptureRook,
        MoveKind::PromoCaptureQueen,
        MoveKind::CastleWhiteShort,
        MoveKind::CastleWhiteLong,
        MoveKind::CastleBlackShort,
        MoveKind::CastleBlackLong,
    ];

    const fn from_bits(bits: u16) -> Option<MoveKind> {
        if (bits as usize) < Self::ALL.len() {
            Some(Self::ALL[bits as usize])
        } else {
            None
        }
    }

    /// Promotion kind for a promotion piece, capturing or not.
    pub const fn promotion(piece: PieceKind, capture: bool) -> MoveKind {
        let base = match piece {
            PieceKind::Knight => 0,
            PieceKind::Bishop => 1,
            PieceKind::Rook => 2,
            _ => 3,
        };
        Self::ALL[3 + base + if capture { 4 } else { 0 }]
    }
}

/// A move packed as `from | to << 6 | kind << 12`.
///
/// Castling is encoded as the king's two-square step. `Move::NULL` (all bits
/// zero, a1a1) never comes out of the generator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Move {
        Move(from.index() as u16 | (to.index() as u16) << 6 | (kind as u16) << 12)
    }

    /// Decode raw bits, e.g. from a hash entry. Rejects unused kind codes.
    #[inline]
    pub const fn from_raw(raw: u16) -> Option<Move> {
        match MoveKind::from_bits(raw >> 12) {
            Some(_) => Some(Move(raw)),
            None => None,
        }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index_unchecked((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    pub const fn kind(self) -> MoveKind {
        MoveKind::ALL[(self.0 >> 12) as usize % MoveKind::ALL.len()]
    }

    /// Removes an enemy piece, en passant included.
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(
            self.kind(),
            MoveKind::Capture
                | MoveKind::EnPassant
                | MoveKind::PromoCaptureKnight
                | MoveKind::PromoCaptureBishop
                | MoveKind::PromoCaptureRook
                | MoveKind::PromoCaptureQueen
        )
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        let k = self.kind() as u8;
        k >= MoveKind::PromoKnight as u8 && k <= MoveKind::PromoCaptureQueen as u8
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        self.kind() as u8 >= MoveKind::CastleWhiteShort as u8
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.kind(), MoveKind::EnPassant)
    }

    /// Captures and promotions: the moves the quiescence search looks at.
    #[inline]
    pub const fn is_noisy(self) -> bool {
        self.is_capture() || self.is_promotion()
    }

    #[inline]
    pub const fn is_quiet(self) -> bool {
        !self.is_noisy()
    }

    pub const fn promotion(self) -> Option<PieceKind> {
        match self.kind() {
            MoveKind::PromoKnight | MoveKind::PromoCaptureKnight => Some(PieceKind::Knight),
            MoveKind::PromoBishop | MoveKind::PromoCaptureBishop => Some(PieceKind::Bishop),
            MoveKind::PromoRook | MoveKind::PromoCaptureRook => Some(PieceKind::Rook),
            MoveKind::PromoQueen | MoveKind::PromoCaptureQueen => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// Coordinate notation, e.g. `e2e4`, `e7e8q`, `0000` for the null move.
    pub fn to_uci(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(piece) = self.promotion() {
            write!(f, "{}", piece.fen_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self}, {:?})", self.kind())
    }
}
