//! Knight, bishop, rook and queen moves.

use crate::attacks::piece_attacks;
use crate::moves::{Move, MoveKind};
use crate::piece::PieceKind;
use crate::position::Position;

use super::{MoveList, Targets};

const KINDS: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

pub(super) fn generate(pos: &Position, targets: Targets, list: &mut MoveList) {
    let us = pos.side_to_move();
    let occupied = pos.occupied();
    for kind in KINDS {
        for from in pos.pieces_of(kind, us) {
            let attacks = piece_attacks(kind, from, occupied);
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
    }
}
