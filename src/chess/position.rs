//! Text serialization of [`Board`]: a five-field variant of [Forsyth-Edwards
//! Notation] without the fullmove counter.
//!
//! [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation

use std::fmt::{self, Write};
use std::num::NonZeroU16;

use anyhow::{bail, Context};

use crate::chess::board::Board;
use crate::chess::core::{File, Piece, PieceKind, Player, Rank, Square, BOARD_WIDTH};

/// Encoding of the [starting position].
///
/// [starting position]: https://www.chessprogramming.org/Initial_Position
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0";

impl Board {
    /// Parses board from the serialized position.
    ///
    /// FEN ::=
    ///       Piece Placement
    ///   ' ' Side to move
    ///   ' ' Castling ability
    ///   ' ' En passant target square
    ///   ' ' Halfmove clock
    ///  (' ' Fullmove counter)?
    ///
    /// The fullmove counter is accepted for compatibility with standard FEN
    /// and discarded: it does not affect the rules.
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use [`Board::try_from`] for cleaning up the
    /// input if it is coming from untrusted source and is likely to contain
    /// extra symbols.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if the input is malformed or describes a
    /// position that can not occur in a game: a side without exactly one king,
    /// pawns on the first or the last rank or an en passant target that no
    /// pawn could have just created.
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let mut result = Self::empty();
        let pieces_placement = match parts.next() {
            Some(placement) => placement,
            None => bail!("incorrect FEN: missing pieces placement"),
        };
        parse_placement(&mut result, pieces_placement)?;
        result.state.side_to_move = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        result.state.castling = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing castling rights"),
        };
        result.state.en_passant = match parts.next() {
            Some("-") => None,
            Some(value) => Some(
                Square::try_from(value)
                    .with_context(|| format!("incorrect FEN: en passant square {value}"))?,
            ),
            None => bail!("incorrect FEN: missing en passant square"),
        };
        result.state.halfmove_clock = match parts.next() {
            Some(value) => {
                if value.is_empty() || !value.bytes().all(|c| c.is_ascii_digit()) {
                    bail!("halfmove clock can not contain anything other than digits");
                }
                value.parse::<u16>().with_context(|| {
                    format!("incorrect FEN: halfmove clock can not be parsed {value}")
                })?
            },
            None => bail!("incorrect FEN: missing halfmove clock"),
        };
        if let Some(value) = parts.next() {
            if value.is_empty() || !value.bytes().all(|c| c.is_ascii_digit()) {
                bail!("fullmove counter can not contain anything other than digits");
            }
            let _ = value.parse::<NonZeroU16>().with_context(|| {
                format!("incorrect FEN: fullmove counter can not be parsed {value}")
            })?;
        }
        if parts.next().is_some() {
            bail!("trailing symbols are not allowed in FEN");
        }
        result.validate()?;
        result.start_tracking();
        Ok(result)
    }

    /// Replaces the game with the decoded position. On error the board is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Same as [`Board::from_fen`].
    pub fn load_fen(&mut self, input: &str) -> anyhow::Result<()> {
        *self = Self::try_from(input)?;
        Ok(())
    }

    /// Serializes piece placement: ranks from 8 to 1, files from a to h.
    #[must_use]
    pub fn placement(&self) -> String {
        let mut result = String::new();
        for rank in Rank::iter().rev() {
            let mut empty_squares = 0;
            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty_squares != 0 {
                            result.push_str(&empty_squares.to_string());
                            empty_squares = 0;
                        }
                        result.push_str(&piece.to_string());
                    },
                    None => empty_squares += 1,
                }
            }
            if empty_squares != 0 {
                result.push_str(&empty_squares.to_string());
            }
            if rank != Rank::One {
                result.push('/');
            }
        }
        result
    }

    /// Identifies the position for the threefold repetition rule: the
    /// serialized position without the halfmove clock.
    #[must_use]
    pub fn position_key(&self) -> String {
        format!(
            "{} {} {} {}",
            self.placement(),
            self.state.side_to_move,
            self.state.castling,
            en_passant_field(self.state.en_passant)
        )
    }

    fn validate(&self) -> anyhow::Result<()> {
        for player in [Player::White, Player::Black] {
            let kings = self
                .pieces(player)
                .iter()
                .filter(|entry| entry.piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                let name = match player {
                    Player::White => "white",
                    Player::Black => "black",
                };
                bail!("expected 1 {name} king, got {kings}");
            }
        }
        for rank in [Rank::One, Rank::Eight] {
            for file in File::iter() {
                let square = Square::new(file, rank);
                if self
                    .piece_at(square)
                    .is_some_and(|piece| piece.kind == PieceKind::Pawn)
                {
                    bail!("pawns can not be placed on backranks, got one on {square}");
                }
            }
        }
        if let Some(target) = self.state.en_passant {
            let them = self.state.side_to_move.opponent();
            let expected_rank = match them {
                Player::White => Rank::Three,
                Player::Black => Rank::Six,
            };
            if target.rank() != expected_rank {
                bail!(
                    "expected en passant square to be on rank {expected_rank}, got {}",
                    target.rank()
                );
            }
            if self.piece_at(target).is_some() {
                bail!("en passant square {target} should be vacant");
            }
            // The pawn that has just made a double step is one rank further.
            let pushed = target.offset(0, them.forward());
            if pushed.and_then(|square| self.piece_at(square))
                != Some(Piece::new(them, PieceKind::Pawn))
            {
                bail!("en passant square is not beyond pushed pawn");
            }
        }
        Ok(())
    }
}

fn parse_placement(board: &mut Board, pieces_placement: &str) -> anyhow::Result<()> {
    let ranks = pieces_placement.split('/');
    let mut rank_id = BOARD_WIDTH;
    for rank_fen in ranks {
        if rank_id == 0 {
            bail!("incorrect FEN: expected 8 ranks, got {pieces_placement}");
        }
        rank_id -= 1;
        let rank = Rank::try_from(rank_id)?;
        let mut file: u8 = 0;
        let mut previous_was_digit = false;
        for symbol in rank_fen.chars() {
            match symbol {
                '0' => bail!("increment can not be 0"),
                '1'..='8' => {
                    if previous_was_digit {
                        bail!("incorrect FEN: consecutive increments in rank {rank_fen}");
                    }
                    previous_was_digit = true;
                    file += symbol as u8 - b'0';
                    if file > BOARD_WIDTH {
                        bail!("incorrect FEN: rank {rank_fen} is wider than {BOARD_WIDTH}");
                    }
                    continue;
                },
                _ => (),
            }
            previous_was_digit = false;
            let piece = Piece::try_from(symbol)?;
            if file >= BOARD_WIDTH {
                bail!("incorrect FEN: rank {rank_fen} is wider than {BOARD_WIDTH}");
            }
            let square = Square::new(file.try_into()?, rank);
            let _ = board.put_new(piece.owner, piece.kind, square);
            file += 1;
        }
        if file != BOARD_WIDTH {
            bail!(
                "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of \
                 length {file}"
            );
        }
    }
    if rank_id != 0 {
        bail!("incorrect FEN: there should be 8 ranks, got {pieces_placement}");
    }
    Ok(())
}

fn en_passant_field(en_passant: Option<Square>) -> String {
    en_passant.map_or_else(|| "-".to_string(), |square| square.to_string())
}

impl TryFrom<&str> for Board {
    type Error = anyhow::Error;

    /// Trims the input and strips the optional "fen" prefix before parsing.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        match input.strip_prefix("fen ") {
            Some(stripped) => Self::from_fen(stripped.trim_start()),
            None => Self::from_fen(input),
        }
    }
}

impl fmt::Display for Board {
    /// Prints the board in the five-field notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position_key(), self.state.halfmove_clock)
    }
}

impl fmt::Debug for Board {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece) a-la Stockfish "debug" command in UCI mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{piece}"),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    write!(f, "{SQUARE_SEPARATOR}")?;
                }
            }
            if rank != Rank::One {
                write!(f, "{LINE_SEPARATOR}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Player to move: {:?}", self.state.side_to_move)?;
        writeln!(f, "En Passant: {:?}", self.state.en_passant)?;
        // bitflags' default fmt::Debug implementation is not very convenient.
        writeln!(f, "Castling rights: {}", self.state.castling)?;
        writeln!(f, "FEN: {self}")?;
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";
