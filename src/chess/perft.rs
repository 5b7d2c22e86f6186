//! [Perft] (*per*formance *t*esting) is a technique for checking correctness of
//! move generation: the number of leaf nodes of the legal move tree is
//! compared to the well-known values.
//!
//! [Perft]: https://www.chessprogramming.org/Perft

use crate::chess::board::Board;
use crate::chess::core::Promotion;
use crate::chess::scanner;

/// Counts the positions reachable in exactly `depth` plies. Each promotion
/// counts once for every piece the pawn can turn into.
#[must_use]
pub fn perft(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for mv in scanner::legal_moves(board) {
        if !board.is_promotion(mv) {
            nodes += if depth == 1 {
                1
            } else {
                let mut next = board.scratch();
                let _ = next.advance(mv, None);
                perft(&next, depth - 1)
            };
            continue;
        }
        for promotion in Promotion::ALL {
            nodes += if depth == 1 {
                1
            } else {
                let mut next = board.scratch();
                let _ = next.advance(mv, Some(promotion));
                perft(&next, depth - 1)
            };
        }
    }
    nodes
}
