//! Copy-make move application.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::moves::{Move, MoveKind};
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::square::Square;

/// Rook origin and destination for each castling kind.
const fn castle_rook(kind: MoveKind) -> Option<(Square, Square)> {
    match kind {
        MoveKind::CastleWhiteShort => Some((Square::H1, Square::F1)),
        MoveKind::CastleWhiteLong => Some((Square::A1, Square::D1)),
        MoveKind::CastleBlackShort => Some((Square::H8, Square::F8)),
        MoveKind::CastleBlackLong => Some((Square::A8, Square::D8)),
        _ => None,
    }
}

impl Position {
    /// Play `mv` on a copy of this position.
    ///
    /// Returns `None` if the move leaves the mover's king attacked or does not
    /// fit the board (empty origin, wrong color, capture onto an empty square).
    pub fn apply(&self, mv: Move) -> Option<Position> {
        let us = self.side_to_move;
        let them = !us;
        let (from, to) = (mv.from(), mv.to());

        let piece = self.piece_on(from)?;
        if piece.color() != us || mv.is_null() {
            return None;
        }
        let target = self.piece_on(to);
        let plain_capture = mv.is_capture() && !mv.is_en_passant();
        match target {
            Some(victim) if !plain_capture || victim.color() == us => return None,
            None if plain_capture => return None,
            _ => {}
        }

        let mut next = *self;
        next.set_en_passant(None);
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);

        if let Some((rook_from, rook_to)) = castle_rook(mv.kind()) {
            next.move_piece(from, to);
            next.move_piece(rook_from, rook_to);
        } else if mv.is_en_passant() {
            next.remove_piece(to.offset(-us.pawn_push()))?;
            next.move_piece(from, to);
        } else {
            if plain_capture {
                next.remove_piece(to);
                next.halfmove_clock = 0;
            }
            match mv.promotion() {
                Some(kind) => {
                    next.remove_piece(from);
                    next.put_piece(Piece::new(kind, us), to);
                }
                None => next.move_piece(from, to),
            }
        }

        if piece.kind() == PieceKind::Pawn {
            next.halfmove_clock = 0;
        }

        let rights = next.castling.after_move(from, to);
        if rights != next.castling {
            next.set_castling(rights);
        }

        next.set_side_to_move(them);
        if us == Color::Black {
            next.fullmove_number = next.fullmove_number.saturating_add(1);
        }

        if piece.kind() == PieceKind::Pawn && from.index().abs_diff(to.index()) == 16 {
            let ep = from.offset(us.pawn_push());
            if next.en_passant_usable(ep) {
                next.set_en_passant(Some(ep));
            }
        }

        if next.is_attacked(next.king_square(us), them) {
            return None;
        }
        next.refresh_derived();
        Some(next)
    }

    /// Pass the turn. Only meaningful when the side to move is not in check.
    pub fn apply_null(&self) -> Position {
        let mut next = *self;
        next.set_en_passant(None);
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
        next.set_side_to_move(!self.side_to_move);
        next.checkers = Bitboard::EMPTY;
        next
    }
}

#[cfg(test)]
mod tests {
    use crate::movegen::{generate, phase};
    use crate::position::Position;
    use crate::square::Square;

    fn play(pos: &Position, uci: &str) -> Position {
        let mv = pos.parse_move(uci).unwrap();
        pos.apply(mv).unwrap()
    }

    fn assert_hashes(pos: &Position) {
        assert_eq!(pos.hashes_from_scratch(), (pos.hash(), pos.pawn_hash()), "{pos}");
    }

    #[test]
    fn every_child_keeps_hashes_consistent() {
        let fens = [
            crate::fen::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ];
        for fen in fens {
            let pos: Position = fen.parse().unwrap();
            for mv in &generate::<phase::All>(&pos) {
                if let Some(child) = pos.apply(mv) {
                    assert_hashes(&child);
                    for reply in &generate::<phase::Evasions>(&child) {
                        if let Some(grandchild) = child.apply(reply) {
                            assert_hashes(&grandchild);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn en_passant_square_only_when_capturable() {
        let pos = Position::startpos();
        let after = play(&pos, "e2e4");
        assert_eq!(after.en_passant(), None);

        let pos: Position = "4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1".parse().unwrap();
        let after = play(&pos, "e2e4");
        assert_eq!(after.en_passant(), Some(Square::E3));
        assert_hashes(&after);
    }

    #[test]
    fn transposition_with_dead_ep_square_hashes_equal() {
        let a = play(&play(&Position::startpos(), "e2e4"), "e7e5");
        let b = play(&play(&play(&play(&Position::startpos(), "e2e3"), "e7e6"), "e3e4"), "e6e5");
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn en_passant_capture_removes_pawn() {
        let pos: Position = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        let after = play(&pos, "e5d6");
        assert!(after.piece_on(Square::D5).is_none());
        assert!(after.piece_on(Square::D6).is_some());
        assert_eq!(after.halfmove_clock(), 0);
        assert_hashes(&after);
    }

    #[test]
    fn castling_moves_rook_and_drops_rights() {
        let pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let after = play(&pos, "e1g1");
        assert!(after.piece_on(Square::F1).is_some());
        assert!(after.piece_on(Square::H1).is_none());
        assert_eq!(after.castling().to_string(), "kq");
        let after = play(&after, "a8a1");
        assert_eq!(after.castling().to_string(), "k");
        assert_hashes(&after);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let pos: Position = "4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1".parse().unwrap();
        let illegal = generate::<phase::All>(&pos)
            .iter()
            .filter(|mv| mv.from() == Square::E2)
            .all(|mv| pos.apply(mv).is_none());
        assert!(illegal);
    }

    #[test]
    fn null_move_flips_side_and_clears_ep() {
        let pos: Position = "4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1".parse().unwrap();
        let null = pos.apply_null();
        assert_eq!(null.side_to_move(), !pos.side_to_move());
        assert_eq!(null.en_passant(), None);
        assert_eq!(null.halfmove_clock(), 1);
        assert_hashes(&null);
    }

    #[test]
    fn capture_claims_that_miss_the_board_are_rejected() {
        let pos = Position::startpos();
        use crate::moves::{Move, MoveKind};
        let bogus = Move::new(Square::E2, Square::E4, MoveKind::Capture);
        assert!(pos.apply(bogus).is_none());
    }
}
