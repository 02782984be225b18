//! Pawn pushes, captures, promotions and en passant.

use crate::attacks::pawn_attacks;
use crate::bitboard::Bitboard;
use crate::moves::{Move, MoveKind};
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

use super::{MoveList, Targets};

const PROMOTIONS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Knight,
    PieceKind::Rook,
    PieceKind::Bishop,
];

fn push_promotions(list: &mut MoveList, from: Square, to: Square, capture: bool) {
    for piece in PROMOTIONS {
        list.push(Move::new(from, to, MoveKind::promotion(piece, capture)));
    }
}

pub(super) fn generate(pos: &Position, targets: Targets, list: &mut MoveList) {
    let us = pos.side_to_move();
    let push = us.pawn_push();
    let pawns = pos.pieces_of(PieceKind::Pawn, us);
    let empty = !pos.occupied();
    let last_rank = Bitboard::relative_rank(us, 7);
    let third_rank = Bitboard::relative_rank(us, 2);

    let single = pawns.forward(us) & empty;
    let double = (single & third_rank).forward(us) & empty;

    if targets.quiets {
        for to in single & !last_rank & targets.quiet {
            list.push(Move::new(to.offset(-push), to, MoveKind::Quiet));
        }
        for to in double & targets.quiet {
            list.push(Move::new(to.offset(-2 * push), to, MoveKind::Quiet));
        }
    }

    if !targets.noisy {
        return;
    }

    // Quiet promotions count as noisy; in evasions they must still block.
    let promo_mask = if targets.quiets { targets.quiet } else { empty };
    for to in single & last_rank & promo_mask {
        push_promotions(list, to.offset(-push), to, false);
    }

    for from in pawns {
        let hits = pawn_attacks(us, from) & targets.capture;
        for to in hits {
            if last_rank.contains(to) {
                push_promotions(list, from, to, true);
            } else {
                list.push(Move::new(from, to, MoveKind::Capture));
            }
        }
    }

    if let Some(ep) = pos.en_passant() {
        let victim = ep.offset(-push);
        // In check, the capture must remove the checker or land on the block ray.
        let relevant = targets.capture.contains(victim)
            || targets.quiet.contains(ep)
            || !pos.in_check();
        if relevant {
            for from in pawn_attacks(!us, ep) & pawns {
                list.push(Move::new(from, ep, MoveKind::EnPassant));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::movegen::{generate, phase};
    use crate::position::Position;

    #[test]
    fn double_push_needs_both_squares_empty() {
        let pos: Position = "4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1".parse().unwrap();
        let pushes = generate::<phase::Quiets>(&pos)
            .iter()
            .filter(|mv| mv.from() == crate::square::Square::E2)
            .count();
        assert_eq!(pushes, 0);
    }

    #[test]
    fn capture_promotions_generate_four_each() {
        let pos: Position = "1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let noisy = generate::<phase::Captures>(&pos);
        assert_eq!(noisy.iter().filter(|mv| mv.is_capture()).count(), 4);
        assert_eq!(noisy.len(), 8);
    }

    #[test]
    fn black_pawns_move_down_the_board() {
        let pos: Position = "4k3/3p4/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
        let quiets: Vec<String> =
            generate::<phase::Quiets>(&pos).iter().map(|mv| mv.to_uci()).collect();
        assert!(quiets.contains(&"d7d6".to_string()));
        assert!(quiets.contains(&"d7d5".to_string()));
    }
}
