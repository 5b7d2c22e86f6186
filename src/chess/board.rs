//! [`Board`] owns the pieces, the game state and the interaction state, and
//! executes moves together with their special-move side effects.

use tracing::{debug, info};

use crate::chess::core::{
    self, CastleRights, CastleSide, File, Piece, PieceKind, Player, Promotion, Rank, Square,
    BOARD_SIZE,
};
use crate::chess::moves::{Move, MoveAttributes};
use crate::chess::scanner::{self, Termination};
use crate::chess::selection::Selection;
use crate::chess::state::GameState;

/// Board-unique identity of a piece. It persists while the piece moves and is
/// never reused for a different piece.
pub type PieceId = u16;

/// Contents of an occupied square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    #[allow(missing_docs)]
    pub id: PieceId,
    #[allow(missing_docs)]
    pub piece: Piece,
}

/// A piece in the roster of its owner together with the square it stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    #[allow(missing_docs)]
    pub id: PieceId,
    #[allow(missing_docs)]
    pub piece: Piece,
    #[allow(missing_docs)]
    pub square: Square,
}

/// The result of playing a move on the live board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Played {
    #[allow(missing_docs)]
    pub mv: Move,
    /// The piece the pawn turned into, if the move was a promotion.
    pub promotion: Option<Promotion>,
    #[allow(missing_docs)]
    pub attributes: MoveAttributes,
    /// Classification of the position after the move.
    pub terminal: Option<Termination>,
}

/// Authoritative state of a chess game: 64 squares, the rosters of both
/// players, [`GameState`], the current [`Selection`] and the cached terminal
/// classification.
///
/// Squares and rosters mirror each other: every roster entry stands on a
/// square that refers back to it and every occupied square belongs to a roster
/// entry. [`Board::assert_consistent`] checks that after each move in debug
/// builds.
#[derive(Clone)]
pub struct Board {
    pub(super) squares: [Option<Occupant>; BOARD_SIZE as usize],
    pub(super) rosters: [Vec<RosterEntry>; 2],
    pub(super) next_id: PieceId,
    pub(super) state: GameState,
    pub(super) selection: Selection,
    pub(super) terminal: Option<Termination>,
}

impl Board {
    /// Board without pieces, White to move and no castling rights.
    pub(super) fn empty() -> Self {
        Self {
            squares: [None; BOARD_SIZE as usize],
            rosters: [Vec::new(), Vec::new()],
            next_id: 0,
            state: GameState {
                castling: CastleRights::empty(),
                ..GameState::starting()
            },
            selection: Selection::default(),
            terminal: None,
        }
    }

    /// Creates the board with the [starting position].
    ///
    /// [starting position]: https://www.chessprogramming.org/Initial_Position
    #[must_use]
    pub fn starting() -> Self {
        const BACKRANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = Self::empty();
        for player in [Player::White, Player::Black] {
            for (file, kind) in File::iter().zip(BACKRANK) {
                let _ = board.put_new(player, kind, Square::new(file, Rank::backrank(player)));
                let _ = board.put_new(
                    player,
                    PieceKind::Pawn,
                    Square::new(file, Rank::pawns_starting(player)),
                );
            }
        }
        board.state = GameState::starting();
        board.start_tracking();
        board
    }

    /// Records the current position as the first one of the game and
    /// classifies it.
    pub(super) fn start_tracking(&mut self) {
        self.state.repetitions.clear();
        self.state.repetitions.record(self.position_key());
        self.selection = Selection::default();
        self.terminal = scanner::classify(self);
    }

    /// Copy of the position without the repetition history and the selection,
    /// used to probe moves without touching the live board.
    #[must_use]
    pub fn scratch(&self) -> Self {
        Self {
            squares: self.squares,
            rosters: self.rosters.clone(),
            next_id: self.next_id,
            state: self.state.scratch(),
            selection: Selection::default(),
            terminal: None,
        }
    }

    /// Whether signed coordinates are on the board.
    #[must_use]
    pub const fn is_inside_board(file: i8, rank: i8) -> bool {
        core::is_inside_board(file, rank)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.occupant(square).map(|occupant| occupant.piece)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn occupant(&self, square: Square) -> Option<Occupant> {
        self.squares[square as usize]
    }

    /// Pieces of the player in no particular order.
    #[must_use]
    pub fn pieces(&self, player: Player) -> &[RosterEntry] {
        &self.rosters[player.index()]
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn king_square(&self, player: Player) -> Option<Square> {
        self.pieces(player)
            .iter()
            .find(|entry| entry.piece.kind == PieceKind::King)
            .map(|entry| entry.square)
    }

    /// Whether any piece of `by` attacks the square.
    #[must_use]
    pub fn square_attacked(&self, square: Square, by: Player) -> bool {
        scanner::square_attacked(self, square, by)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.state.side_to_move
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn castle_rights(&self) -> CastleRights {
        self.state.castling
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn en_passant_square(&self) -> Option<Square> {
        self.state.en_passant
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn halfmove_clock(&self) -> u16 {
        self.state.halfmove_clock
    }

    /// How the game ended or `None` if it is still in progress.
    #[must_use]
    pub const fn terminal(&self) -> Option<Termination> {
        self.terminal
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Occupies the square, capturing its previous occupant if there was one.
    pub fn place(&mut self, occupant: Occupant, square: Square) {
        if self.squares[square as usize].is_some() {
            let _ = self.remove_capture(square);
        }
        self.squares[square as usize] = Some(occupant);
        if let Some(entry) = self.rosters[occupant.piece.owner.index()]
            .iter_mut()
            .find(|entry| entry.id == occupant.id)
        {
            entry.square = square;
        }
    }

    /// Detaches the occupant of the square without destroying it. The piece
    /// has to be placed again to restore consistency.
    pub fn lift(&mut self, square: Square) -> Option<Occupant> {
        self.squares[square as usize].take()
    }

    /// Detaches and destroys the occupant of the square. A capture is an
    /// irreversible move: the halfmove clock and the repetition history are
    /// reset.
    pub fn remove_capture(&mut self, square: Square) -> Option<Occupant> {
        let captured = self.destroy(square)?;
        self.state.reset_draw_counters();
        Some(captured)
    }

    /// Registers a brand-new piece with a fresh identity and places it.
    pub fn put_new(&mut self, owner: Player, kind: PieceKind, square: Square) -> Occupant {
        let occupant = Occupant {
            id: self.next_id,
            piece: Piece::new(owner, kind),
        };
        self.next_id += 1;
        self.rosters[owner.index()].push(RosterEntry {
            id: occupant.id,
            piece: occupant.piece,
            square,
        });
        self.place(occupant, square);
        occupant
    }

    fn destroy(&mut self, square: Square) -> Option<Occupant> {
        let occupant = self.lift(square)?;
        self.rosters[occupant.piece.owner.index()].retain(|entry| entry.id != occupant.id);
        Some(occupant)
    }

    /// Checks that squares and rosters describe the same set of pieces.
    ///
    /// # Panics
    ///
    /// If any piece is missing from either side or they disagree.
    pub fn assert_consistent(&self) {
        let mut rostered = 0;
        for player in [Player::White, Player::Black] {
            for entry in self.pieces(player) {
                assert_eq!(
                    entry.piece.owner, player,
                    "{entry:?} is in the roster of {player:?}"
                );
                assert_eq!(
                    self.occupant(entry.square),
                    Some(Occupant {
                        id: entry.id,
                        piece: entry.piece,
                    }),
                    "square {} does not refer back to {entry:?}",
                    entry.square
                );
                rostered += 1;
            }
        }
        let occupied = self.squares.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, rostered, "occupied squares and rosters disagree");
        if let Some(target) = self.state.en_passant {
            assert!(
                self.piece_at(target).is_none(),
                "en passant target {target} is occupied"
            );
        }
    }

    /// Moves the pieces: relocates the mover, captures, relocates the rook when
    /// castling and removes the bypassed pawn of an en passant capture. Game
    /// state bookkeeping is left to [`Board::advance`].
    ///
    /// # Panics
    ///
    /// If there is no piece on the source square of the move.
    pub(super) fn apply(&mut self, mv: Move) -> MoveAttributes {
        let Some(mover) = self.lift(mv.from()) else {
            panic!("no piece to move on {}: {mv}", mv.from());
        };
        let mut attributes = MoveAttributes::empty();
        if self.squares[mv.to() as usize].is_some() {
            attributes |= MoveAttributes::CAPTURE;
        }
        match mover.piece.kind {
            PieceKind::King if (mv.from().file() as u8).abs_diff(mv.to().file() as u8) >= 2 => {
                let side = if mv.to().file() > mv.from().file() {
                    CastleSide::Short
                } else {
                    CastleSide::Long
                };
                let rank = mv.from().rank();
                if let Some(rook) = self.lift(Square::new(side.rook_file(), rank)) {
                    self.place(rook, Square::new(side.rook_target_file(), rank));
                }
                attributes |= match side {
                    CastleSide::Short => MoveAttributes::KINGSIDE_CASTLE,
                    CastleSide::Long => MoveAttributes::QUEENSIDE_CASTLE,
                };
            },
            PieceKind::Pawn => {
                attributes |= MoveAttributes::PAWN_MOVE;
                if mv.from().file() != mv.to().file()
                    && !attributes.contains(MoveAttributes::CAPTURE)
                {
                    let bypassed = Square::new(mv.to().file(), mv.from().rank());
                    if self.destroy(bypassed).is_some() {
                        attributes |= MoveAttributes::CAPTURE | MoveAttributes::EN_PASSANT;
                    }
                }
                if (mv.from().rank() as u8).abs_diff(mv.to().rank() as u8) == 2 {
                    attributes |= MoveAttributes::DOUBLE_PAWN_PUSH;
                }
                if mv.to().rank() == Rank::promotion(mover.piece.owner) {
                    attributes |= MoveAttributes::PROMOTION;
                }
            },
            _ => (),
        }
        self.place(mover, mv.to());
        attributes
    }

    /// Executes the move and updates the game state: castling rights, en
    /// passant target, promotion, the halfmove clock and the turn. Does not
    /// record repetitions or classify the result, so it is suitable for
    /// probing moves on a [`Board::scratch`] copy.
    ///
    /// A promoting pawn becomes a queen unless told otherwise.
    pub(super) fn advance(&mut self, mv: Move, promotion: Option<Promotion>) -> MoveAttributes {
        let player = self.state.side_to_move;
        self.state.en_passant = None;
        let king_moved = self
            .piece_at(mv.from())
            .is_some_and(|piece| piece.kind == PieceKind::King);

        let attributes = self.apply(mv);

        let mut lost = CastleRights::guarded_by(mv.from());
        if king_moved {
            lost |= CastleRights::both(player);
        }
        // Landing on a corner means its rook is gone.
        if mv.to().file() != File::E {
            lost |= CastleRights::guarded_by(mv.to());
        }
        self.state.castling.remove(lost);

        if attributes.contains(MoveAttributes::DOUBLE_PAWN_PUSH) {
            self.state.en_passant = mv.from().offset(0, player.forward());
        }
        if attributes.contains(MoveAttributes::PROMOTION) {
            let _ = self.destroy(mv.to());
            let kind = PieceKind::from(promotion.unwrap_or(Promotion::Queen));
            let _ = self.put_new(player, kind, mv.to());
        }
        if attributes.is_irreversible() {
            self.state.reset_draw_counters();
        } else {
            self.state.halfmove_clock = self.state.halfmove_clock.saturating_add(1);
        }
        self.state.side_to_move = player.opponent();
        attributes
    }

    /// Plays the move on the live board: executes it, records the new position
    /// in the repetition history and classifies it.
    pub(super) fn play(&mut self, mv: Move, promotion: Option<Promotion>) -> Played {
        let player = self.state.side_to_move;
        let attributes = self.advance(mv, promotion);
        self.state.repetitions.record(self.position_key());
        self.selection = Selection::default();
        self.terminal = scanner::classify(self);
        if cfg!(debug_assertions) {
            self.assert_consistent();
        }
        let promotion = attributes
            .contains(MoveAttributes::PROMOTION)
            .then(|| promotion.unwrap_or(Promotion::Queen));
        info!(%mv, ?player, ?promotion, ?attributes, "move played");
        if let Some(terminal) = self.terminal {
            info!(%terminal, "game over");
        } else {
            debug!(position = %self, "game continues");
        }
        Played {
            mv,
            promotion,
            attributes,
            terminal: self.terminal,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}
