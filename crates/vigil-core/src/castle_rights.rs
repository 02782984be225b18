//! Castling rights as a 4-bit mask.

use std::fmt;

use crate::color::Color;
use crate::square::Square;

/// Castling rights: bit 0 = White short, 1 = White long, 2 = Black short, 3 = Black long.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastleRights(u8);

/// Rights lost when a piece leaves or lands on each square.
const REVOKED_BY: [CastleRights; 64] = {
    let mut table = [CastleRights::NONE; 64];
    table[Square::E1.index()] = CastleRights::WHITE_BOTH;
    table[Square::A1.index()] = CastleRights::WHITE_LONG;
    table[Square::H1.index()] = CastleRights::WHITE_SHORT;
    table[Square::E8.index()] = CastleRights::BLACK_BOTH;
    table[Square::A8.index()] = CastleRights::BLACK_LONG;
    table[Square::H8.index()] = CastleRights::BLACK_SHORT;
    table
};

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const ALL: CastleRights = CastleRights(0b1111);
    pub const WHITE_SHORT: CastleRights = CastleRights(0b0001);
    pub const WHITE_LONG: CastleRights = CastleRights(0b0010);
    pub const BLACK_SHORT: CastleRights = CastleRights(0b0100);
    pub const BLACK_LONG: CastleRights = CastleRights(0b1000);
    pub const WHITE_BOTH: CastleRights = CastleRights(0b0011);
    pub const BLACK_BOTH: CastleRights = CastleRights(0b1100);

    #[inline]
    pub const fn from_bits(bits: u8) -> CastleRights {
        CastleRights(bits & 0b1111)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: CastleRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn with(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 | other.0)
    }

    #[inline]
    pub const fn without(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 & !other.0)
    }

    /// Rights that remain for `color` only.
    #[inline]
    pub const fn for_color(self, color: Color) -> CastleRights {
        match color {
            Color::White => CastleRights(self.0 & Self::WHITE_BOTH.0),
            Color::Black => CastleRights(self.0 & Self::BLACK_BOTH.0),
        }
    }

    /// Rights after a move touching `from` and `to`.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> CastleRights {
        self.without(REVOKED_BY[from.index()]).without(REVOKED_BY[to.index()])
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (flag, c) in [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ] {
            if self.contains(flag) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights({self})")
    }
}
