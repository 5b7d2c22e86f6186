//! The surface a front end talks to: [`Game`] owns the [`Board`] and the
//! [`PromotionChooser`] that answers "which piece should the pawn become?".

use anyhow::bail;
use tracing::info;

use crate::chess::board::{Board, Played};
use crate::chess::core::{Player, Promotion, Square, BOARD_WIDTH};
use crate::chess::moves::{Move, MoveRequest};
use crate::chess::scanner::{self, Termination};
use crate::chess::selection::SelectOutcome;

/// Picks the piece a pawn is promoted to. The request is synchronous: the move
/// is only played once the answer is known.
pub trait PromotionChooser {
    /// Returns the piece for the promoting pawn of `player`.
    ///
    /// # Errors
    ///
    /// If no choice could be made (e.g. the input was closed). The move is
    /// not played then.
    fn choose_promotion(&mut self, player: Player) -> anyhow::Result<Promotion>;
}

/// Always the same piece.
impl PromotionChooser for Promotion {
    fn choose_promotion(&mut self, _player: Player) -> anyhow::Result<Promotion> {
        Ok(*self)
    }
}

impl<F> PromotionChooser for F
where
    F: FnMut(Player) -> anyhow::Result<Promotion>,
{
    fn choose_promotion(&mut self, player: Player) -> anyhow::Result<Promotion> {
        self(player)
    }
}

/// A game of chess driven by clicks on the board.
pub struct Game<C> {
    board: Board,
    chooser: C,
}

impl<C: PromotionChooser> Game<C> {
    /// Starts a game from the starting position.
    #[must_use]
    pub fn new(chooser: C) -> Self {
        Self {
            board: Board::starting(),
            chooser,
        }
    }

    /// Starts a game from the serialized position.
    ///
    /// # Errors
    ///
    /// If the position can not be decoded.
    pub fn from_fen(input: &str, chooser: C) -> anyhow::Result<Self> {
        Ok(Self {
            board: Board::try_from(input)?,
            chooser,
        })
    }

    /// Handles a click on the square in the given row and column as the front
    /// end sees them: row 0 is the top of the board (rank 8), column 0 is the
    /// a-file.
    ///
    /// # Errors
    ///
    /// If the indices are outside of the board or [`Board::select`] fails.
    pub fn select(
        &mut self,
        rank_index: usize,
        file_index: usize,
    ) -> anyhow::Result<SelectOutcome> {
        let width = usize::from(BOARD_WIDTH);
        if rank_index >= width || file_index >= width {
            bail!(
                "square indices should be within 0..{width}, got ({rank_index}, {file_index})"
            );
        }
        let row = u8::try_from(rank_index)?;
        let column = u8::try_from(file_index)?;
        let square = Square::new(column.try_into()?, (BOARD_WIDTH - 1 - row).try_into()?);
        self.select_square(square)
    }

    /// Handles a click on the square.
    ///
    /// # Errors
    ///
    /// See [`Board::select`].
    pub fn select_square(&mut self, square: Square) -> anyhow::Result<SelectOutcome> {
        self.board.select(square, &mut self.chooser)
    }

    /// Plays a move typed in by the player.
    ///
    /// # Errors
    ///
    /// See [`Board::play_request`].
    pub fn play(&mut self, request: MoveRequest) -> anyhow::Result<Played> {
        self.board.play_request(request, &mut self.chooser)
    }

    /// Abandons the current game and starts a new one.
    pub fn reset_to_starting_position(&mut self) {
        info!("new game");
        self.board = Board::starting();
    }

    /// Replaces the current game with the serialized position. On error the
    /// current game goes on.
    ///
    /// # Errors
    ///
    /// If the position can not be decoded.
    pub fn load(&mut self, input: &str) -> anyhow::Result<()> {
        self.board.load_fen(input)?;
        info!(position = %self.board, "position loaded");
        Ok(())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn terminal(&self) -> Option<Termination> {
        self.board.terminal()
    }

    /// The player who delivered checkmate.
    #[must_use]
    pub const fn winner(&self) -> Option<Player> {
        match self.board.terminal() {
            Some(Termination::Checkmate) => Some(self.board.side_to_move().opponent()),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.board.side_to_move()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// All legal moves of the side to move.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        scanner::legal_moves(&self.board)
    }

    #[allow(missing_docs)]
    pub fn chooser_mut(&mut self) -> &mut C {
        &mut self.chooser
    }
}

impl Default for Game<Promotion> {
    fn default() -> Self {
        Self::new(Promotion::Queen)
    }
}
