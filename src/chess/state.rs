//! Game state that is not visible from the placement of the pieces alone.

use std::collections::HashMap;

use crate::chess::core::{CastleRights, Player, Square};

/// Fifty full moves of both players without a capture or a pawn move.
pub const HALFMOVE_CLOCK_LIMIT: u16 = 50;

/// Positions repeated this many times end the game in a draw.
pub const REPETITION_LIMIT: u8 = 3;

/// Counts occurrences of positions since the last irreversible move.
///
/// Positions are identified by their key (see
/// [`crate::chess::board::Board::position_key`]): the placement and the side
/// to move together with castling rights and the en passant target, since the
/// same placement with different options is a different position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepetitionTable {
    table: HashMap<String, u8>,
}

impl RepetitionTable {
    /// Creates an empty repetition table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all entries from the repetition history.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Checks whether the repetition table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Records another occurrence of the position.
    pub fn record(&mut self, key: String) {
        let count = self.table.entry(key).or_insert(0);
        *count = count.saturating_add(1);
    }

    #[cfg(test)]
    fn count(&self, key: &str) -> u8 {
        self.table.get(key).copied().unwrap_or(0)
    }

    /// The largest occurrence count of any position.
    #[must_use]
    pub fn max_count(&self) -> u8 {
        self.table.values().copied().max().unwrap_or(0)
    }
}

/// Turn, castling rights, en passant target and the draw bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub(super) side_to_move: Player,
    pub(super) castling: CastleRights,
    /// Square "behind" the pawn that has just made a double step; the only
    /// square an en passant capture can land on.
    pub(super) en_passant: Option<Square>,
    /// [Halfmove Clock][^ply] keeps track of the number of halfmoves since the
    /// last capture, pawn move or castle and is used to enforce the fifty-move
    /// draw rule.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    /// [^ply]: "Half-move" or "ply" means a move of only one side.
    pub(super) halfmove_clock: u16,
    pub(super) repetitions: RepetitionTable,
}

impl GameState {
    /// State at the beginning of a standard game.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            side_to_move: Player::White,
            castling: CastleRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            repetitions: RepetitionTable::new(),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn castling(&self) -> CastleRights {
        self.castling
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn repetitions(&self) -> &RepetitionTable {
        &self.repetitions
    }

    /// Whether the fifty-move rule applies.
    #[must_use]
    pub const fn halfmove_clock_expired(&self) -> bool {
        self.halfmove_clock >= HALFMOVE_CLOCK_LIMIT
    }

    /// Called after captures, pawn moves and castling.
    pub(super) fn reset_draw_counters(&mut self) {
        self.halfmove_clock = 0;
        self.repetitions.clear();
    }

    /// Copy of the state without the repetition history, for probing moves.
    pub(super) fn scratch(&self) -> Self {
        Self {
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            repetitions: RepetitionTable::new(),
        }
    }
}
