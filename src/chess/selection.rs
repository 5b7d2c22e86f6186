//! Interaction state of a graphical front end: the selected square and the
//! destinations highlighted for it. Clicks on the board end up in
//! [`Board::select`].

use anyhow::{bail, Context};
use tracing::debug;

use crate::chess::board::{Board, Played};
use crate::chess::core::{PieceKind, Rank, Square};
use crate::chess::game::PromotionChooser;
use crate::chess::moves::{Move, MoveList, MoveRequest};
use crate::chess::pieces;

/// The selected piece and its legal destinations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
    highlighted: MoveList,
}

impl Selection {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// Legal moves of the selected piece.
    #[must_use]
    pub fn highlighted(&self) -> &[Move] {
        &self.highlighted
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_selected(&self, square: Square) -> bool {
        self.selected == Some(square)
    }

    /// Whether the selected piece can move to the square.
    #[must_use]
    pub fn is_highlighted(&self, square: Square) -> bool {
        self.highlighted.iter().any(|mv| mv.to() == square)
    }
}

/// What a click on the board did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A piece of the side to move was selected and its destinations are
    /// highlighted.
    Selected(Square),
    /// Nothing was selected and the square does not hold a piece of the side
    /// to move.
    Ignored,
    /// The selected piece moved to the square.
    Moved(Played),
    /// The square is not a legal destination: the selection was dropped.
    Cleared,
}

impl Board {
    /// Handles a click on the square.
    ///
    /// - With nothing selected, a piece of the side to move gets selected and
    ///   anything else is ignored.
    /// - With a piece selected, a highlighted square plays the move, a
    ///   different piece of the side to move is selected instead and any other
    ///   square (including the selected one) clears the selection.
    ///
    /// Promotion moves ask the chooser for the piece before touching the board.
    ///
    /// # Errors
    ///
    /// If the game is already over or the chooser fails. The board is left
    /// unchanged in both cases.
    pub fn select(
        &mut self,
        square: Square,
        chooser: &mut dyn PromotionChooser,
    ) -> anyhow::Result<SelectOutcome> {
        if let Some(terminal) = self.terminal {
            bail!("the game is over: {terminal}");
        }
        let own_piece = self
            .piece_at(square)
            .is_some_and(|piece| piece.owner == self.side_to_move());
        let Some(selected) = self.selection.selected else {
            if own_piece {
                return Ok(self.pick(square));
            }
            debug!(%square, "ignored click");
            return Ok(SelectOutcome::Ignored);
        };
        let chosen = self
            .selection
            .highlighted
            .iter()
            .find(|mv| mv.to() == square)
            .copied();
        if let Some(mv) = chosen {
            let promotion = if self.is_promotion(mv) {
                Some(
                    chooser
                        .choose_promotion(self.side_to_move())
                        .context("choosing the promotion piece")?,
                )
            } else {
                None
            };
            return Ok(SelectOutcome::Moved(self.play(mv, promotion)));
        }
        if own_piece && square != selected {
            return Ok(self.pick(square));
        }
        debug!(%square, %selected, "selection cleared");
        self.selection = Selection::default();
        Ok(SelectOutcome::Cleared)
    }

    /// Plays a move typed in by the player. The promotion piece is taken from
    /// the request, falling back to the chooser if it is not specified.
    ///
    /// # Errors
    ///
    /// If the game is over, the move is not legal, a promotion piece is given
    /// for a move that does not promote or the chooser fails.
    pub fn play_request(
        &mut self,
        request: MoveRequest,
        chooser: &mut dyn PromotionChooser,
    ) -> anyhow::Result<Played> {
        if let Some(terminal) = self.terminal {
            bail!("the game is over: {terminal}");
        }
        if self.piece_at(request.from).map(|piece| piece.owner) != Some(self.side_to_move()) {
            bail!(
                "illegal move: {request}, {} has no {:?} piece",
                request.from,
                self.side_to_move()
            );
        }
        let Some(mv) = pieces::legal_moves(self, request.from)
            .into_iter()
            .find(|mv| mv.to() == request.to)
        else {
            bail!("illegal move: {request}");
        };
        let promotion = match (self.is_promotion(mv), request.promotion) {
            (true, Some(promotion)) => Some(promotion),
            (true, None) => Some(
                chooser
                    .choose_promotion(self.side_to_move())
                    .context("choosing the promotion piece")?,
            ),
            (false, Some(promotion)) => {
                bail!("{mv} is not a promotion, can not promote to {promotion}")
            },
            (false, None) => None,
        };
        Ok(self.play(mv, promotion))
    }

    /// Whether the square holds a king that is in check.
    #[must_use]
    pub fn is_attacked_king(&self, square: Square) -> bool {
        self.piece_at(square).is_some_and(|piece| {
            piece.kind == PieceKind::King && self.square_attacked(square, piece.owner.opponent())
        })
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_selected(&self, square: Square) -> bool {
        self.selection.is_selected(square)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_highlighted(&self, square: Square) -> bool {
        self.selection.is_highlighted(square)
    }

    fn pick(&mut self, square: Square) -> SelectOutcome {
        let highlighted = pieces::legal_moves(self, square);
        debug!(%square, destinations = highlighted.len(), "piece selected");
        self.selection = Selection {
            selected: Some(square),
            highlighted,
        };
        SelectOutcome::Selected(square)
    }

    pub(super) fn is_promotion(&self, mv: Move) -> bool {
        self.piece_at(mv.from()).is_some_and(|piece| {
            piece.kind == PieceKind::Pawn && mv.to().rank() == Rank::promotion(piece.owner)
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::core::{Piece, Player, Promotion};
    use crate::chess::moves::MoveAttributes;
    use crate::chess::scanner::Termination;

    #[test]
    fn select_and_move() {
        let mut board = Board::starting();
        let mut chooser = Promotion::Queen;
        assert_eq!(
            board.select(Square::E4, &mut chooser).unwrap(),
            SelectOutcome::Ignored
        );
        // Opponent's pieces can not be selected.
        assert_eq!(
            board.select(Square::E7, &mut chooser).unwrap(),
            SelectOutcome::Ignored
        );
        assert_eq!(
            board.select(Square::E2, &mut chooser).unwrap(),
            SelectOutcome::Selected(Square::E2)
        );
        assert!(board.is_selected(Square::E2));
        assert!(board.is_highlighted(Square::E3));
        assert!(board.is_highlighted(Square::E4));
        assert!(!board.is_highlighted(Square::E5));
        assert_eq!(board.selection().highlighted().len(), 2);

        let SelectOutcome::Moved(played) = board.select(Square::E4, &mut chooser).unwrap() else {
            panic!("expected a move");
        };
        assert_eq!(played.mv, Move::new(Square::E2, Square::E4, false));
        assert_eq!(played.terminal, None);
        assert_eq!(board.selection(), &Selection::default());
        assert_eq!(board.side_to_move(), Player::Black);
        assert_eq!(
            board.to_string(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0"
        );
    }

    #[test]
    fn reselect_and_clear() {
        let mut board = Board::starting();
        let mut chooser = Promotion::Queen;
        let _ = board.select(Square::E2, &mut chooser).unwrap();
        assert_eq!(
            board.select(Square::G1, &mut chooser).unwrap(),
            SelectOutcome::Selected(Square::G1)
        );
        assert!(board.is_highlighted(Square::F3));
        assert!(!board.is_highlighted(Square::E4));
        // Illegal destination.
        assert_eq!(
            board.select(Square::G4, &mut chooser).unwrap(),
            SelectOutcome::Cleared
        );
        assert_eq!(board.selection().selected(), None);
        // Same square twice.
        let _ = board.select(Square::B1, &mut chooser).unwrap();
        assert_eq!(
            board.select(Square::B1, &mut chooser).unwrap(),
            SelectOutcome::Cleared
        );
        assert_eq!(board.to_string(), Board::starting().to_string());
    }

    #[test]
    fn promotion_asks_chooser_first() {
        let mut board = Board::try_from("8/1P5k/8/8/8/8/8/K7 w - - 0").unwrap();
        let mut failing = |_: Player| -> anyhow::Result<Promotion> { bail!("dialog closed") };
        let _ = board.select(Square::B7, &mut failing).unwrap();
        let before = board.to_string();
        assert!(board.select(Square::B8, &mut failing).is_err());
        assert_eq!(board.to_string(), before);

        let mut knight = Promotion::Knight;
        let SelectOutcome::Moved(played) = board.select(Square::B8, &mut knight).unwrap() else {
            panic!("expected a move");
        };
        assert_eq!(played.promotion, Some(Promotion::Knight));
        assert!(played.attributes.contains(MoveAttributes::PROMOTION));
        assert_eq!(
            board.piece_at(Square::B8),
            Some(Piece::new(Player::White, PieceKind::Knight))
        );
        // K+N vs K.
        assert_eq!(board.terminal(), Some(Termination::InsufficientMaterial));
        assert!(board.select(Square::H7, &mut knight).is_err());
    }

    #[test]
    fn typed_moves() {
        let mut board = Board::try_from("8/1P5k/8/8/8/8/8/K7 w - - 0").unwrap();
        let mut chooser = Promotion::Queen;
        assert!(board
            .play_request(MoveRequest::try_from("b7b6").unwrap(), &mut chooser)
            .is_err());
        assert!(board
            .play_request(MoveRequest::try_from("h7h6").unwrap(), &mut chooser)
            .is_err());
        assert!(board
            .play_request(MoveRequest::try_from("a1a2q").unwrap(), &mut chooser)
            .is_err());
        let played = board
            .play_request(MoveRequest::try_from("b7b8r").unwrap(), &mut chooser)
            .unwrap();
        assert_eq!(played.promotion, Some(Promotion::Rook));
        assert_eq!(board.to_string(), "1R6/7k/8/8/8/8/8/K7 b - - 0");
    }

    #[test]
    fn attacked_king() {
        let board = Board::try_from("k7/1Q6/K7/8/8/8/8/8 b - - 0").unwrap();
        assert!(board.is_attacked_king(Square::A8));
        assert!(!board.is_attacked_king(Square::A6));
        assert!(!board.is_attacked_king(Square::B7));
    }
}
