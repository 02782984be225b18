//! Draws by rule: fifty moves and repetition.

use vigil_core::{Position, generate, phase};

/// Fifty-move rule. A checkmate delivered on the hundredth half-move still
/// counts as a mate.
pub(super) fn fifty_move_draw(pos: &Position) -> bool {
    pos.halfmove_clock() >= 100 && (!pos.in_check() || has_legal_move(pos))
}

fn has_legal_move(pos: &Position) -> bool {
    generate::<phase::Evasions>(pos)
        .iter()
        .any(|mv| pos.apply(mv).is_some())
}

/// `path[path.len() - 1]` is the node being searched and `path[root..]` the
/// line from the root. Only same-side positions inside the last `lookback`
/// reversible plies can repeat it. One earlier occurrence inside the search
/// line counts as a draw; occurrences before the root need two.
pub(super) fn is_repetition(path: &[u64], root: usize, lookback: usize) -> bool {
    let Some((&current, _)) = path.split_last() else {
        return false;
    };
    let last = path.len() - 1;
    let mut seen = 0;
    for back in (4..=lookback).step_by(2) {
        let Some(index) = last.checked_sub(back) else {
            break;
        };
        if path[index] != current {
            continue;
        }
        if index >= root {
            return true;
        }
        seen += 1;
        if seen >= 2 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repetition_inside_the_line_needs_one_hit() {
        let path = [1, 2, 3, 4, 5, 6, 7, 8, 9, 6];
        // Node 6 at index 9 repeats index 5 (four plies back), inside the line.
        assert!(is_repetition(&path, 2, 100));
        // Not when the reversible window is too short.
        assert!(!is_repetition(&path, 2, 3));
    }

    #[test]
    fn game_history_needs_two_hits() {
        let once = [7, 1, 2, 3, 7];
        assert!(!is_repetition(&once, 4, 100));
        let twice = [7, 1, 2, 3, 7, 1, 2, 3, 7];
        assert!(is_repetition(&twice, 8, 100));
    }

    #[test]
    fn odd_distances_are_ignored() {
        let path = [5, 1, 2, 5, 9];
        assert!(!is_repetition(&[5, 1, 2, 5], 0, 100));
        assert!(!is_repetition(&path, 0, 100));
    }

    #[test]
    fn fifty_moves_draw_unless_mated() {
        let quiet: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 100 80".parse().unwrap();
        assert!(fifty_move_draw(&quiet));
        let fresh: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 99 80".parse().unwrap();
        assert!(!fifty_move_draw(&fresh));
        let mated: Position = "R3k3/8/4K3/8/8/8/8/8 b - - 100 80".parse().unwrap();
        assert!(mated.in_check());
        assert!(!fifty_move_draw(&mated));
        let escapes: Position = "R3k3/8/8/8/8/8/8/4K3 b - - 100 80".parse().unwrap();
        assert!(fifty_move_draw(&escapes));
    }
}
