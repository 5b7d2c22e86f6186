//! Attack and check detection, legal move filtering and classification of
//! finished games.

use std::fmt;

use tracing::debug;

use crate::chess::board::Board;
use crate::chess::core::{Direction, PieceKind, Player, Square};
use crate::chess::moves::{Move, MoveList};
use crate::chess::pieces::{self, KNIGHT_OFFSETS};
use crate::chess::state::REPETITION_LIMIT;

/// The reason a game is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The side to move is in check and has no legal moves.
    Checkmate,
    /// The side to move is not in check and has no legal moves.
    Stalemate,
    /// The same position has occurred three times.
    ThreefoldRepetition,
    /// Neither side can checkmate the other.
    InsufficientMaterial,
    /// Fifty moves of each side without a capture, pawn move or castle.
    FiftyMoveRule,
}

impl Termination {
    /// Everything but a checkmate is a draw.
    #[must_use]
    pub const fn is_draw(self) -> bool {
        !matches!(self, Self::Checkmate)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::ThreefoldRepetition => "threefold repetition",
            Self::InsufficientMaterial => "insufficient material",
            Self::FiftyMoveRule => "fifty-move rule",
        })
    }
}

/// Checks whether any piece of `by` attacks the square.
///
/// Walks each of the 8 lines from the square to the first occupied square: if
/// it holds a piece of `by` that can reach the square with a pseudo-legal move,
/// the square is attacked. Pawns attack their two forward diagonals whether or
/// not there is something to capture. Knights are found by jumping back from
/// the square.
#[must_use]
pub fn square_attacked(board: &Board, square: Square, by: Player) -> bool {
    for direction in Direction::ALL {
        let mut current = square;
        while let Some(next) = current.shift(direction) {
            let Some(piece) = board.piece_at(next) else {
                current = next;
                continue;
            };
            if piece.owner == by {
                let reaches = match piece.kind {
                    PieceKind::Pawn => {
                        // Adjacent diagonal, one rank behind the square.
                        direction.is_diagonal()
                            && square.offset(0, -by.forward()).map(Square::rank)
                                == Some(next.rank())
                    },
                    PieceKind::Knight => false,
                    _ => pieces::pseudo_moves(board, next)
                        .iter()
                        .any(|mv| mv.to() == square),
                };
                if reaches {
                    return true;
                }
            }
            break;
        }
    }
    KNIGHT_OFFSETS.into_iter().any(|(file_delta, rank_delta)| {
        square
            .offset(file_delta, rank_delta)
            .and_then(|from| board.piece_at(from))
            .is_some_and(|piece| piece.owner == by && piece.kind == PieceKind::Knight)
    })
}

/// Whether the king of the player is attacked.
#[must_use]
pub fn in_check(board: &Board, player: Player) -> bool {
    board
        .king_square(player)
        .is_some_and(|king| square_attacked(board, king, player.opponent()))
}

/// Keeps the moves that do not leave the mover's king attacked. Each move is
/// replayed on a scratch copy of the board; the board itself is not touched.
#[must_use]
pub fn filter_legal(board: &Board, moves: MoveList) -> MoveList {
    let total = moves.len();
    let legal: MoveList = moves
        .into_iter()
        .filter(|mv| {
            let Some(mover) = board.piece_at(mv.from()) else {
                return false;
            };
            let mut scratch = board.scratch();
            let _ = scratch.apply(*mv);
            !in_check(&scratch, mover.owner)
        })
        .collect();
    if legal.len() != total {
        debug!(
            probed = total,
            legal = legal.len(),
            "moves leaving the king attacked were dropped"
        );
    }
    legal
}

/// All legal moves of the side to move.
#[must_use]
pub fn legal_moves(board: &Board) -> Vec<Move> {
    board
        .pieces(board.side_to_move())
        .iter()
        .flat_map(|entry| pieces::legal_moves(board, entry.square))
        .collect()
}

/// Whether the side to move has at least one legal move.
#[must_use]
pub fn has_legal_move(board: &Board) -> bool {
    board
        .pieces(board.side_to_move())
        .iter()
        .any(|entry| !pieces::legal_moves(board, entry.square).is_empty())
}

/// Checks whether the player can not possibly checkmate the opponent: all it
/// has is the king and either nothing else, a single minor piece or only
/// bishops that live on the same tile color.
#[must_use]
pub fn insufficient_material(board: &Board, player: Player) -> bool {
    let mut minors = Vec::new();
    for entry in board.pieces(player) {
        match entry.piece.kind {
            PieceKind::King => (),
            kind if kind.can_deliver_mate_alone() => return false,
            _ => minors.push(entry),
        }
    }
    if minors.len() <= 1 {
        return true;
    }
    let Some(first) = minors.first() else {
        return true;
    };
    minors.iter().all(|entry| {
        entry.piece.kind == PieceKind::Bishop && entry.square.color() == first.square.color()
    })
}

/// Determines whether the game is over for the side to move. Checkmate and
/// stalemate take precedence, then repetition, insufficient material and the
/// fifty-move rule.
#[must_use]
pub fn classify(board: &Board) -> Option<Termination> {
    let player = board.side_to_move();
    if !has_legal_move(board) {
        return Some(if in_check(board, player) {
            Termination::Checkmate
        } else {
            Termination::Stalemate
        });
    }
    if board.state().repetitions().max_count() >= REPETITION_LIMIT {
        return Some(Termination::ThreefoldRepetition);
    }
    if insufficient_material(board, Player::White) && insufficient_material(board, Player::Black)
    {
        return Some(Termination::InsufficientMaterial);
    }
    if board.state().halfmove_clock_expired() {
        return Some(Termination::FiftyMoveRule);
    }
    None
}
