//! Move generation for individual pieces.
//!
//! Every piece has two entry points: [`pseudo_moves`] obeys the movement
//! patterns and occupancy but ignores the safety of the own king, and
//! [`legal_moves`] filters them through [`crate::chess::scanner`]. Attack
//! detection only ever uses the pseudo-legal path, so there is no recursion
//! between the two.

use crate::chess::board::Board;
use crate::chess::core::{CastleSide, Direction, File, Piece, PieceKind, Player, Rank, Square};
use crate::chess::moves::{Move, MoveList};
use crate::chess::scanner;

/// Knight jumps as (file, rank) deltas.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Moves of the piece standing on `from` that follow its movement pattern.
/// Castling is not included: it depends on attacked squares and is only
/// generated by [`legal_moves`]. Empty if the square is vacant.
#[must_use]
pub fn pseudo_moves(board: &Board, from: Square) -> MoveList {
    let mut moves = MoveList::new();
    let Some(piece) = board.piece_at(from) else {
        return moves;
    };
    match piece.kind {
        PieceKind::King => {
            let offsets = Direction::ALL.map(Direction::offset);
            steps(board, piece, from, offsets, &mut moves);
        },
        PieceKind::Queen => slides(board, piece, from, &Direction::ALL, &mut moves),
        PieceKind::Rook => slides(board, piece, from, &Direction::ORTHOGONAL, &mut moves),
        PieceKind::Bishop => slides(board, piece, from, &Direction::DIAGONAL, &mut moves),
        PieceKind::Knight => steps(board, piece, from, KNIGHT_OFFSETS, &mut moves),
        PieceKind::Pawn => pawn_moves(board, piece.owner, from, &mut moves),
    }
    moves
}

/// Moves of the piece standing on `from` that do not leave its king attacked,
/// including castling for the king.
#[must_use]
pub fn legal_moves(board: &Board, from: Square) -> MoveList {
    let mut moves = scanner::filter_legal(board, pseudo_moves(board, from));
    if let Some(piece) = board.piece_at(from) {
        if piece.kind == PieceKind::King {
            castling_moves(board, piece.owner, from, &mut moves);
        }
    }
    moves
}

fn candidate(board: &Board, from: Square, to: Square) -> Move {
    Move::new(from, to, board.piece_at(to).is_some())
}

/// Ray-casts one step at a time: empty squares are added and the ray goes on,
/// the first occupied square ends it and is only added if it holds an enemy.
fn slides(
    board: &Board,
    piece: Piece,
    from: Square,
    directions: &[Direction],
    moves: &mut MoveList,
) {
    for &direction in directions {
        let mut current = from;
        while let Some(to) = current.shift(direction) {
            match board.piece_at(to) {
                None => moves.push(candidate(board, from, to)),
                Some(blocker) => {
                    if blocker.owner != piece.owner {
                        moves.push(candidate(board, from, to));
                    }
                    break;
                },
            }
            current = to;
        }
    }
}

fn steps<const N: usize>(
    board: &Board,
    piece: Piece,
    from: Square,
    offsets: [(i8, i8); N],
    moves: &mut MoveList,
) {
    for (file_delta, rank_delta) in offsets {
        let Some(to) = from.offset(file_delta, rank_delta) else {
            continue;
        };
        if board.piece_at(to).is_some_and(|occupant| occupant.owner == piece.owner) {
            continue;
        }
        moves.push(candidate(board, from, to));
    }
}

fn pawn_moves(board: &Board, owner: Player, from: Square, moves: &mut MoveList) {
    let forward = owner.forward();
    if let Some(push) = from.offset(0, forward) {
        if board.piece_at(push).is_none() {
            moves.push(candidate(board, from, push));
            if from.rank() == Rank::pawns_starting(owner) {
                if let Some(double_push) = push.offset(0, forward) {
                    if board.piece_at(double_push).is_none() {
                        moves.push(candidate(board, from, double_push));
                    }
                }
            }
        }
    }
    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, forward) else {
            continue;
        };
        let captures = board.piece_at(to).is_some_and(|piece| piece.owner != owner);
        if captures || board.en_passant_square() == Some(to) {
            moves.push(candidate(board, from, to));
        }
    }
}

/// Adds castling moves of the king standing on `from`. The king has to be on
/// its home square with the corresponding right still held, the squares
/// between the king and the rook have to be empty, the rook has to be on its
/// corner and the king can not start, pass or land on an attacked square.
fn castling_moves(board: &Board, owner: Player, from: Square, moves: &mut MoveList) {
    let backrank = Rank::backrank(owner);
    if from != Square::new(File::E, backrank) {
        return;
    }
    let opponent = owner.opponent();
    if board.square_attacked(from, opponent) {
        return;
    }
    for side in [CastleSide::Short, CastleSide::Long] {
        if !board.castle_rights().contains(side.right(owner)) {
            continue;
        }
        let corner = Square::new(side.rook_file(), backrank);
        if board.piece_at(corner) != Some(Piece::new(owner, PieceKind::Rook)) {
            continue;
        }
        let mut between = from;
        let mut path_clear = true;
        while let Some(square) = between.shift(side.direction()) {
            if square == corner {
                break;
            }
            if board.piece_at(square).is_some() {
                path_clear = false;
                break;
            }
            between = square;
        }
        if !path_clear {
            continue;
        }
        let target = Square::new(side.king_target_file(), backrank);
        let walk_safe = [side.rook_target_file(), side.king_target_file()]
            .into_iter()
            .all(|file| !board.square_attacked(Square::new(file, backrank), opponent));
        if walk_safe {
            moves.push(candidate(board, from, target));
        }
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sorted_moves(moves: &[Move]) -> Vec<String> {
        moves.iter().map(Move::to_string).sorted().collect()
    }

    #[test]
    fn starting_knight() {
        let board = Board::starting();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::G1)),
            vec!["g1f3", "g1h3"]
        );
        assert!(legal_moves(&board, Square::F1).is_empty());
        assert!(legal_moves(&board, Square::E4).is_empty());
    }

    #[test]
    fn starting_pawn() {
        let board = Board::starting();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::E2)),
            vec!["e2e3", "e2e4"]
        );
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let board = Board::try_from("k7/8/8/3p4/8/1P1R2p1/8/K7 w - - 0").unwrap();
        assert_eq!(
            sorted_moves(&pseudo_moves(&board, Square::D3)),
            vec!["d3c3", "d3d1", "d3d2", "d3d4", "d3d5", "d3e3", "d3f3", "d3g3"]
        );
        assert!(candidate(&board, Square::D3, Square::D5).is_capture());
        assert!(!candidate(&board, Square::D3, Square::D4).is_capture());
    }

    #[test]
    fn queen_in_the_middle() {
        let board = Board::try_from("k7/8/8/8/3Q4/8/8/7K w - - 0").unwrap();
        assert_eq!(pseudo_moves(&board, Square::D4).len(), 27);
    }

    #[test]
    fn pawn_captures_and_en_passant() {
        let board = Board::try_from("k7/8/8/3pPp2/8/8/8/K7 w - d6 0").unwrap();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::E5)),
            vec!["e5d6", "e5e6"]
        );
        let board = Board::try_from("k7/8/8/8/8/2n1n3/3P4/K7 w - - 0").unwrap();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::D2)),
            vec!["d2c3", "d2d3", "d2d4", "d2e3"]
        );
        // Blocked double step.
        let board = Board::try_from("k7/8/8/8/3n4/8/3P4/K7 w - - 0").unwrap();
        assert_eq!(sorted_moves(&legal_moves(&board, Square::D2)), vec!["d2d3"]);
    }

    #[test]
    fn pinned_piece() {
        let board = Board::try_from("k3r3/8/8/8/8/8/4B3/4K3 w - - 0").unwrap();
        assert_eq!(pseudo_moves(&board, Square::E2).len(), 9);
        assert!(legal_moves(&board, Square::E2).is_empty());
    }

    #[test]
    fn castling() {
        let board = Board::try_from("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0").unwrap();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::E1)),
            vec!["e1c1", "e1d1", "e1d2", "e1e2", "e1f1", "e1f2", "e1g1"]
        );
        // Not in pseudo-legal moves.
        assert_eq!(pseudo_moves(&board, Square::E1).len(), 5);

        // No rights.
        let board = Board::try_from("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0").unwrap();
        assert_eq!(legal_moves(&board, Square::E1).len(), 5);

        // Knight between the king and the rook blocks the long castle even
        // though the king never crosses b1.
        let board = Board::try_from("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0").unwrap();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::E1)),
            vec!["e1d1", "e1d2", "e1e2", "e1f1", "e1f2", "e1g1"]
        );

        // Attacked f1 prevents the short castle.
        let board = Board::try_from("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0").unwrap();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::E1)),
            vec!["e1c1", "e1d1", "e1d2", "e1e2"]
        );

        // Can not castle out of check.
        let board = Board::try_from("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0").unwrap();
        assert_eq!(
            sorted_moves(&legal_moves(&board, Square::E1)),
            vec!["e1d1", "e1e2", "e1f1"]
        );
    }

    #[test]
    fn castling_needs_rook_on_corner() {
        let board = Board::try_from("4k3/8/8/8/8/8/8/4K2B w K - 0").unwrap();
        assert_eq!(legal_moves(&board, Square::E1).len(), 5);
    }
}
