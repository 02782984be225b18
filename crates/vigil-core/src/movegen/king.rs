//! King steps, check evasions and castling.

use crate::attacks::{between, king_attacks};
use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::moves::{Move, MoveKind};
use crate::position::Position;
use crate::square::Square;

use super::{MoveList, Targets};

struct Castle {
    right: CastleRights,
    king_to: Square,
    rook_from: Square,
    kind: MoveKind,
}

const WHITE_CASTLES: [Castle; 2] = [
    Castle {
        right: CastleRights::WHITE_SHORT,
        king_to: Square::G1,
        rook_from: Square::H1,
        kind: MoveKind::CastleWhiteShort,
    },
    Castle {
        right: CastleRights::WHITE_LONG,
        king_to: Square::C1,
        rook_from: Square::A1,
        kind: MoveKind::CastleWhiteLong,
    },
];

const BLACK_CASTLES: [Castle; 2] = [
    Castle {
        right: CastleRights::BLACK_SHORT,
        king_to: Square::G8,
        rook_from: Square::H8,
        kind: MoveKind::CastleBlackShort,
    },
    Castle {
        right: CastleRights::BLACK_LONG,
        king_to: Square::C8,
        rook_from: Square::A8,
        kind: MoveKind::CastleBlackLong,
    },
];

pub(super) fn generate(pos: &Position, targets: Targets, list: &mut MoveList) {
    let us = pos.side_to_move();
    let from = pos.king_square(us);
    let attacks = king_attacks(from);
    if targets.noisy {
        for to in attacks & targets.capture {
            list.push(Move::new(from, to, MoveKind::Capture));
        }
    }
    if targets.quiets {
        for to in attacks & targets.quiet {
            list.push(Move::new(from, to, MoveKind::Quiet));
        }
    }
}

/// King steps out of check. Squares still covered once the king has left
/// its origin are skipped, so sliders cannot be outrun along their own ray.
pub(super) fn evasions(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = !us;
    let from = pos.king_square(us);
    let without_king = pos.occupied() ^ from.bitboard();
    let enemies = pos.side(them);
    for to in king_attacks(from) & !pos.side(us) {
        if pos.is_attacked_with(to, them, without_king) {
            continue;
        }
        let kind = if enemies.contains(to) { MoveKind::Capture } else { MoveKind::Quiet };
        list.push(Move::new(from, to, kind));
    }
}

/// Castling moves that are fully legal: right held, path empty, and none of
/// the king's origin, transit and destination squares attacked.
pub(super) fn castling(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let rights = pos.castling().for_color(us);
    if rights.is_empty() {
        return;
    }
    let from = pos.king_square(us);
    let occupied = pos.occupied();
    let castles = match us {
        Color::White => &WHITE_CASTLES,
        Color::Black => &BLACK_CASTLES,
    };
    for castle in castles {
        if !rights.contains(castle.right) || (between(from, castle.rook_from) & occupied).any() {
            continue;
        }
        let king_path = between(from, castle.king_to) | castle.king_to.bitboard() | from.bitboard();
        if king_path.map(|sq| pos.is_attacked(sq, !us)).any(|hit| hit) {
            continue;
        }
        list.push(Move::new(from, castle.king_to, castle.kind));
    }
}
