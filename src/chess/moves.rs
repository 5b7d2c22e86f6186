//! Move representation and the extra information produced when a move is
//! executed.

use std::fmt;

use anyhow::{bail, Context};
use arrayvec::ArrayVec;

use crate::chess::core::{Promotion, Square};

/// Represents a move of a single piece from one square to another. Castling is
/// a king move spanning two files: the rook relocation is derived when the move
/// is executed, the same way en passant and promotion are.
///
/// Moves only store coordinates, so they can be replayed against a copy of the
/// board they were generated for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    capture: bool,
}

impl Move {
    /// Creates a move. `capture` is whether the destination square was
    /// occupied when the move was generated.
    #[must_use]
    pub const fn new(from: Square, to: Square, capture: bool) -> Self {
        Self { from, to, capture }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Whether the destination was occupied. En passant captures land on an
    /// empty square and are reported through [`MoveAttributes`] instead.
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        self.capture
    }
}

impl fmt::Display for Move {
    /// Serializes a move in [UCI format] (without the promotion letter, which
    /// is only known once the player chooses it).
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Moves of a single piece. The queen in the middle of an empty board has the
/// most options (27), which puts an upper bound on the size.
pub type MoveList = ArrayVec<Move, 32>;

/// A move typed by a player in [UCI format]: two squares and an optional
/// promotion letter, e.g. `e2e4` or `b7b8q`.
///
/// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    #[allow(missing_docs)]
    pub promotion: Option<Promotion>,
}

impl TryFrom<&str> for MoveRequest {
    type Error = anyhow::Error;

    fn try_from(uci: &str) -> anyhow::Result<Self> {
        let uci = uci.trim();
        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            bail!("move should be in UCI format (e.g. e2e4 or a7a8q), got '{uci}'");
        }
        let from = Square::try_from(&uci[..2]).context("parsing source square")?;
        let to = Square::try_from(&uci[2..4]).context("parsing destination square")?;
        let promotion = match uci[4..].chars().next() {
            Some(symbol) => Some(Promotion::try_from(symbol)?),
            None => None,
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

bitflags::bitflags! {
    /// Side effects a [`Move`] had once it was executed on the board.
    ///
    /// Apart from the "regular" or "quiet" moves (simply moving a piece from
    /// one square to the other), there are few important rules:
    ///
    /// - [En passant] is a capture of opponent's pawn "in passing" (when it
    ///   advances two squares from its original position).
    /// - The [Castle] move that will involve a king and a rook "jumping" over
    ///   each other. Technically, castling is a king move, so `from` and `to`
    ///   move squares will correspond to the king.
    ///
    /// Captures, pawn moves and castling are irreversible: the position before
    /// them can never occur again.
    ///
    /// [Castle]: https://en.wikipedia.org/wiki/Castling
    /// [En passant]: https://en.wikipedia.org/wiki/En_passant
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MoveAttributes: u8 {
        /// A piece was removed from the board.
        const CAPTURE = 0b0000_0001;
        /// Pawn capture onto the en passant target square.
        const EN_PASSANT = 0b0000_0010;
        /// Pawn advancement by 2 squares from the original rank (second for
        /// white and seventh for black).
        const DOUBLE_PAWN_PUSH = 0b0000_0100;
        /// Short castle or O-O.
        const KINGSIDE_CASTLE = 0b0000_1000;
        /// Long castle or O-O-O.
        const QUEENSIDE_CASTLE = 0b0001_0000;
        /// Pawn move to the opponent's "home" rank.
        const PROMOTION = 0b0010_0000;
        #[allow(missing_docs)]
        const PAWN_MOVE = 0b0100_0000;
    }
}

impl MoveAttributes {
    /// Either side castle.
    pub const CASTLE: Self = Self::KINGSIDE_CASTLE.union(Self::QUEENSIDE_CASTLE);

    /// Whether the move resets the halfmove clock and the repetition history.
    #[must_use]
    pub const fn is_irreversible(self) -> bool {
        self.intersects(Self::CAPTURE.union(Self::PAWN_MOVE).union(Self::CASTLE))
    }
}
