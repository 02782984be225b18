//! FEN parsing and printing for [`Position`].

use std::fmt;
use std::str::FromStr;

use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::Piece;
use crate::position::Position;
use crate::square::Square;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Position {
    type Err = FenError;

    /// Accepts 4 to 6 fields; missing move counters default to `0 1`.
    fn from_str(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }
        for (i, text) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0usize;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as usize;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPiece(c))?;
                let sq = u8::try_from(file)
                    .ok()
                    .and_then(|f| Square::from_coords(f, rank))
                    .ok_or(FenError::RankLength { rank: i + 1, squares: file + 1 })?;
                pos.put_piece(piece, sq);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::RankLength { rank: i + 1, squares: file });
            }
        }

        let side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSide(other.to_string())),
        };
        pos.set_side_to_move(side);

        let mut rights = CastleRights::NONE;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                rights = rights.with(match c {
                    'K' => CastleRights::WHITE_SHORT,
                    'Q' => CastleRights::WHITE_LONG,
                    'k' => CastleRights::BLACK_SHORT,
                    'q' => CastleRights::BLACK_LONG,
                    other => return Err(FenError::InvalidCastling(other)),
                });
            }
        }
        pos.set_castling(rights);

        if fields[3] != "-" {
            let ep: Square = fields[3].parse()?;
            if ep.relative_rank(side) != 5 {
                return Err(FenError::InvalidSquare(fields[3].to_string()));
            }
            // An unusable target is dropped so the hash matches the same
            // position reached over the board.
            if pos.en_passant_usable(ep) {
                pos.set_en_passant(Some(ep));
            }
        }

        pos.halfmove_clock = parse_counter(fields.get(4), "halfmove clock", 0)?;
        pos.fullmove_number = parse_counter(fields.get(5), "fullmove number", 1)?.max(1);

        pos.validate()?;
        pos.refresh_derived();
        Ok(pos)
    }
}

fn parse_counter(field: Option<&&str>, name: &'static str, default: u16) -> Result<u16, FenError> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| FenError::InvalidCounter {
            field: name,
            value: text.to_string(),
        }),
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let piece = Square::from_coords(file, rank).and_then(|sq| self.piece_on(sq));
                match piece {
                    Some(p) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", p.fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > 0 {
                f.write_str("/")?;
            }
        }
        write!(f, " {} {} ", self.side_to_move, self.castling)?;
        match self.en_passant {
            Some(sq) => write!(f, "{sq}")?,
            None => f.write_str("-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_standard_positions() {
        for fen in [
            STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3",
        ] {
            let pos: Position = fen.parse().unwrap();
            assert_eq!(pos.to_string(), fen);
        }
    }

    #[test]
    fn short_fen_gets_default_counters() {
        let pos: Position = "4k3/8/8/8/8/8/8/4K3 b - -".parse().unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        assert_eq!(pos.to_string(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    }

    #[test]
    fn unusable_ep_square_is_dropped() {
        let pos: Position = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .unwrap();
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.hashes_from_scratch().0, pos.hash());
    }

    #[test]
    fn errors() {
        assert_eq!("".parse::<Position>(), Err(FenError::FieldCount(0)));
        assert_eq!(
            "8/8/8/8/8/8/8 w - - 0 1".parse::<Position>(),
            Err(FenError::RankCount(7))
        );
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1".parse::<Position>(),
            Err(FenError::RankLength { .. })
        ));
        assert_eq!(
            "4k3/8/8/8/8/8/8/4X3 w - - 0 1".parse::<Position>(),
            Err(FenError::InvalidPiece('X'))
        );
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1".parse::<Position>(),
            Err(FenError::InvalidSide(_))
        ));
        assert_eq!(
            "4k3/8/8/8/8/8/8/4K3 w Z - 0 1".parse::<Position>(),
            Err(FenError::InvalidCastling('Z'))
        );
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - e4 0 1".parse::<Position>(),
            Err(FenError::InvalidSquare(_))
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/4K3 w - - x 1".parse::<Position>(),
            Err(FenError::InvalidCounter { .. })
        ));
        assert!(matches!(
            "4k3/8/8/8/8/8/8/8 w - - 0 1".parse::<Position>(),
            Err(FenError::Position(_))
        ));
    }
}
