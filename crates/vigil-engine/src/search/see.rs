//! Static exchange evaluation: the material balance of the capture sequence
//! on one square, each side recapturing with its least valuable attacker.

use vigil_core::{Bitboard, Move, PieceKind, Position, bishop_attacks, rook_attacks};

/// Exchange values indexed by [`PieceKind::index`].
pub const SEE_VALUE: [i32; PieceKind::COUNT] = [100, 320, 330, 500, 900, 20_000];

#[inline]
pub fn value(kind: PieceKind) -> i32 {
    SEE_VALUE[kind.index()]
}

/// Value of whatever `mv` captures; en passant takes a pawn.
pub fn victim_value(pos: &Position, mv: Move) -> i32 {
    if mv.is_en_passant() {
        return value(PieceKind::Pawn);
    }
    pos.piece_on(mv.to()).map_or(0, |p| value(p.kind()))
}

fn least_valuable(pos: &Position, attackers: Bitboard) -> Option<(Bitboard, PieceKind)> {
    PieceKind::ALL.into_iter().find_map(|kind| {
        let sq = (attackers & pos.pieces(kind)).lsb()?;
        Some((sq.bitboard(), kind))
    })
}

/// Net material won by the side to move after the best exchange on
/// `mv.to()`. Quiet moves start from zero, so a hanging destination scores
/// negative.
pub fn see(pos: &Position, mv: Move) -> i32 {
    let (from, to) = (mv.from(), mv.to());
    let Some(mover) = pos.piece_on(from) else {
        return 0;
    };

    let mut occupied = pos.occupied() ^ from.bitboard();
    let mut gain = [0i32; 32];
    gain[0] = victim_value(pos, mv);
    let mut on_square = value(mover.kind());

    if let Some(promo) = mv.promotion() {
        gain[0] += value(promo) - value(PieceKind::Pawn);
        on_square = value(promo);
    }
    if mv.is_en_passant() {
        occupied ^= to.bitboard().forward(!pos.side_to_move());
    }

    let diagonal = pos.pieces(PieceKind::Bishop) | pos.pieces(PieceKind::Queen);
    let straight = pos.pieces(PieceKind::Rook) | pos.pieces(PieceKind::Queen);
    let mut attackers = pos.attackers_to(to, occupied) & occupied;
    let mut side = !pos.side_to_move();
    let mut depth = 0;

    while depth + 1 < gain.len() {
        let Some((piece, kind)) = least_valuable(pos, attackers & pos.side(side)) else {
            break;
        };
        depth += 1;
        gain[depth] = on_square - gain[depth - 1];
        // Neither continuation can change the sign of the outcome.
        if gain[depth].max(-gain[depth - 1]) < 0 {
            break;
        }
        on_square = value(kind);
        occupied ^= piece;
        // Sliders behind the piece just removed join in.
        if matches!(kind, PieceKind::Pawn | PieceKind::Bishop | PieceKind::Queen) {
            attackers |= bishop_attacks(to, occupied) & diagonal;
        }
        if matches!(kind, PieceKind::Rook | PieceKind::Queen) {
            attackers |= rook_attacks(to, occupied) & straight;
        }
        attackers &= occupied;
        side = !side;
    }

    while depth > 0 {
        gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
        depth -= 1;
    }
    gain[0]
}

#[inline]
pub fn see_ge(pos: &Position, mv: Move, threshold: i32) -> bool {
    see(pos, mv) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn see_of(fen: &str, uci: &str) -> i32 {
        let pos: Position = fen.parse().unwrap();
        let mv = pos.parse_move(uci).unwrap();
        see(&pos, mv)
    }

    #[test]
    fn free_pawn() {
        assert_eq!(see_of("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4d5"), 100);
    }

    #[test]
    fn defended_pawn_with_queen_loses() {
        assert_eq!(see_of("4k3/2p5/3p4/8/8/8/3Q4/4K3 w - - 0 1", "d2d6"), 100 - 900);
    }

    #[test]
    fn even_trade() {
        assert_eq!(see_of("4k3/8/5n2/3n4/8/4N3/8/4K3 w - - 0 1", "e3d5"), 0);
    }

    #[test]
    fn xray_rooks_back_each_other() {
        // Rxd5 Rxd5 Rxd5: white's second rook wins the exchange on d5.
        assert_eq!(
            see_of("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1", "d2d5"),
            100 - 500 + 500
        );
    }

    #[test]
    fn undefended_capture_by_pawn_of_knight() {
        assert_eq!(see_of("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1", "e4d5"), 320);
    }

    #[test]
    fn en_passant_wins_a_pawn() {
        assert_eq!(see_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5d6"), 100);
    }

    #[test]
    fn quiet_move_onto_attacked_square_is_negative() {
        assert_eq!(see_of("4k3/8/8/2p5/8/1N6/8/4K3 w - - 0 1", "b3d4"), -320);
        assert!(see_ge(&Position::startpos(), Position::startpos().parse_move("g1f3").unwrap(), 0));
    }

    #[test]
    fn promotion_counts_the_new_piece() {
        assert_eq!(see_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8q"), 800);
    }
}
